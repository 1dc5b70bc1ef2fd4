// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema registry
//!
//! Definitions and fields are numbered by registration order, starting at 1.
//! The registry is read-mostly: many readers may resolve IDs concurrently
//! while a single thread registers new entries. Registration itself is not
//! serialized here beyond the lock; callers must not register from two
//! readers at once.

mod defaults;
mod definition;
mod field;

pub use defaults::{
    definition_ids, field_ids, temporary_critical_definition, temporary_critical_field,
    DEFAULT_DEFINITIONS, DEFAULT_FIELDS,
};
pub use definition::{Definition, DefinitionInfo, IMMUTABLE_INSTANCES, IMMUTABLE_SCHEMA};
pub use field::{DataType, FieldDefinition, FieldInfo, IMMUTABLE_VALUE};

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema already contains {count} definitions")]
    AlreadyInitialized { count: usize },
    #[error("name must not be empty")]
    EmptyName,
    #[error("a definition named {0} already exists")]
    DuplicateDefinition(String),
    #[error("a field named {0} already exists")]
    DuplicateField(String),
    #[error("parent definition does not exist with ID {0}")]
    UnknownParent(u64),
    #[error("{kind} does not exist with ID {id}")]
    NotFound { kind: &'static str, id: u64 },
    #[error("{kind} {id} is immutable")]
    Frozen { kind: &'static str, id: u64 },
    #[error("built-in {kind} {name} registered as ID {actual}, expected {expected}")]
    IdMismatch {
        kind: &'static str,
        name: String,
        expected: u64,
        actual: u64,
    },
}

/// Parameters for a new definition
#[derive(Debug, Clone, Default)]
pub struct NewDefinition {
    pub name: String,
    pub inherited_id: Option<u64>,
    pub immutable: u64,
}

impl NewDefinition {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn inherits(mut self, parent: u64) -> Self {
        self.inherited_id = Some(parent);
        self
    }

    pub fn immutable(mut self, flags: u64) -> Self {
        self.immutable = flags;
        self
    }
}

#[derive(Debug, Default)]
struct Registry {
    definitions: Vec<Arc<Definition>>,
    fields: Vec<Arc<FieldDefinition>>,
}

/// Registry of definitions and fields
#[derive(Debug, Default)]
pub struct Schema {
    registry: RwLock<Registry>,
}

impl Schema {
    /// An empty schema, as seen at the very start of a bootstrapping log
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema holding every built-in definition and field
    pub fn with_defaults() -> Result<Self, SchemaError> {
        let schema = Self::new();
        schema.create_defaults()?;
        Ok(schema)
    }

    /// Register the built-in definitions and fields with their fixed IDs
    pub fn create_defaults(&self) -> Result<(), SchemaError> {
        let mut registry = self.write();
        if !registry.definitions.is_empty() || !registry.fields.is_empty() {
            return Err(SchemaError::AlreadyInitialized {
                count: registry.definitions.len(),
            });
        }

        for (expected, name) in DEFAULT_DEFINITIONS {
            let definition = Self::push_definition(&mut registry, NewDefinition::named(*name))?;
            if definition.id() != *expected {
                return Err(SchemaError::IdMismatch {
                    kind: "definition",
                    name: (*name).to_string(),
                    expected: *expected,
                    actual: definition.id(),
                });
            }
        }
        for (expected, name, data_type) in DEFAULT_FIELDS {
            let field = Self::push_field(&mut registry, name, *data_type, 0)?;
            if field.id() != *expected {
                return Err(SchemaError::IdMismatch {
                    kind: "field",
                    name: (*name).to_string(),
                    expected: *expected,
                    actual: field.id(),
                });
            }
        }

        tracing::debug!(
            definitions = registry.definitions.len(),
            fields = registry.fields.len(),
            "created default schema"
        );
        Ok(())
    }

    pub fn register_definition(&self, new: NewDefinition) -> Result<Arc<Definition>, SchemaError> {
        let mut registry = self.write();
        let definition = Self::push_definition(&mut registry, new)?;
        tracing::debug!(id = definition.id(), name = definition.name(), "registered definition");
        Ok(definition)
    }

    pub fn register_field(
        &self,
        name: &str,
        data_type: DataType,
        immutable: u64,
    ) -> Result<Arc<FieldDefinition>, SchemaError> {
        let mut registry = self.write();
        let field = Self::push_field(&mut registry, name, data_type, immutable)?;
        tracing::debug!(id = field.id(), name = field.name(), %data_type, "registered field");
        Ok(field)
    }

    /// Rename a registered definition.
    ///
    /// The registry entry is replaced; `Arc`s handed out earlier keep the old name.
    pub fn rename_definition(&self, id: u64, name: &str) -> Result<Arc<Definition>, SchemaError> {
        let mut registry = self.write();
        let index = Self::index(id, registry.definitions.len()).ok_or(SchemaError::NotFound {
            kind: "definition",
            id,
        })?;
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        let current = Arc::clone(&registry.definitions[index]);
        if !current.can_update_definition() {
            return Err(SchemaError::Frozen {
                kind: "definition",
                id,
            });
        }
        if registry.definitions.iter().any(|d| d.id() != id && d.name() == name) {
            return Err(SchemaError::DuplicateDefinition(name.to_string()));
        }
        let renamed = Arc::new(current.renamed(name));
        registry.definitions[index] = Arc::clone(&renamed);
        tracing::debug!(id, from = current.name(), to = name, "renamed definition");
        Ok(renamed)
    }

    /// Rename a registered field, see [`Schema::rename_definition`]
    pub fn rename_field(&self, id: u64, name: &str) -> Result<Arc<FieldDefinition>, SchemaError> {
        let mut registry = self.write();
        let index = Self::index(id, registry.fields.len())
            .ok_or(SchemaError::NotFound { kind: "field", id })?;
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        let current = Arc::clone(&registry.fields[index]);
        if !current.can_update_definition() {
            return Err(SchemaError::Frozen { kind: "field", id });
        }
        if registry.fields.iter().any(|f| f.id() != id && f.name() == name) {
            return Err(SchemaError::DuplicateField(name.to_string()));
        }
        let renamed = Arc::new(current.renamed(name));
        registry.fields[index] = Arc::clone(&renamed);
        tracing::debug!(id, from = current.name(), to = name, "renamed field");
        Ok(renamed)
    }

    /// Registered definition with this ID
    pub fn definition(&self, id: u64) -> Option<Arc<Definition>> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.read().definitions.get(index).cloned()
    }

    /// Registered field with this ID
    pub fn field(&self, id: u64) -> Option<Arc<FieldDefinition>> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.read().fields.get(index).cloned()
    }

    /// Registered definition, falling back to the bootstrap stand-ins for IDs 1..=3
    pub fn resolve_definition(&self, id: u64) -> Option<Arc<Definition>> {
        self.definition(id)
            .or_else(|| temporary_critical_definition(id).map(Arc::new))
    }

    /// Registered field, falling back to the bootstrap stand-ins for IDs 1..=3
    pub fn resolve_field(&self, id: u64) -> Option<Arc<FieldDefinition>> {
        self.field(id)
            .or_else(|| temporary_critical_field(id).map(Arc::new))
    }

    pub fn definition_by_name(&self, name: &str) -> Option<Arc<Definition>> {
        self.read()
            .definitions
            .iter()
            .find(|d| d.name() == name)
            .cloned()
    }

    pub fn field_by_name(&self, name: &str) -> Option<Arc<FieldDefinition>> {
        self.read().fields.iter().find(|f| f.name() == name).cloned()
    }

    pub fn definitions(&self) -> Vec<Arc<Definition>> {
        self.read().definitions.clone()
    }

    pub fn fields(&self) -> Vec<Arc<FieldDefinition>> {
        self.read().fields.clone()
    }

    pub fn definition_count(&self) -> usize {
        self.read().definitions.len()
    }

    pub fn field_count(&self) -> usize {
        self.read().fields.len()
    }

    /// ID the next registered definition will receive
    pub fn next_definition_id(&self) -> u64 {
        self.definition_count() as u64 + 1
    }

    /// ID the next registered field will receive
    pub fn next_field_id(&self) -> u64 {
        self.field_count() as u64 + 1
    }

    /// The definition followed by its parents, nearest first.
    ///
    /// Parents always have lower IDs than their children, so the walk ends.
    pub fn ancestry(&self, id: u64) -> Vec<Arc<Definition>> {
        let mut chain = Vec::new();
        let mut next = self.resolve_definition(id);
        while let Some(definition) = next {
            next = match definition.inherited_id() {
                Some(parent) if parent < definition.id() => self.resolve_definition(parent),
                _ => None,
            };
            chain.push(definition);
        }
        chain
    }

    /// Whether `id` is `ancestor` or inherits from it
    pub fn inherits_from(&self, id: u64, ancestor: u64) -> bool {
        self.ancestry(id).iter().any(|d| d.id() == ancestor)
    }

    fn push_definition(
        registry: &mut Registry,
        new: NewDefinition,
    ) -> Result<Arc<Definition>, SchemaError> {
        if new.name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if registry.definitions.iter().any(|d| d.name() == new.name) {
            return Err(SchemaError::DuplicateDefinition(new.name));
        }
        let id = registry.definitions.len() as u64 + 1;
        let inherited_id = new.inherited_id.filter(|parent| *parent != 0);
        if let Some(parent) = inherited_id {
            if parent >= id {
                return Err(SchemaError::UnknownParent(parent));
            }
        }
        let definition = Arc::new(Definition::new(id, new.name, inherited_id, new.immutable));
        registry.definitions.push(Arc::clone(&definition));
        Ok(definition)
    }

    fn push_field(
        registry: &mut Registry,
        name: &str,
        data_type: DataType,
        immutable: u64,
    ) -> Result<Arc<FieldDefinition>, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if registry.fields.iter().any(|f| f.name() == name) {
            return Err(SchemaError::DuplicateField(name.to_string()));
        }
        let id = registry.fields.len() as u64 + 1;
        let field = Arc::new(FieldDefinition::new(id, name, data_type, immutable));
        registry.fields.push(Arc::clone(&field));
        Ok(field)
    }

    fn index(id: u64, len: usize) -> Option<usize> {
        usize::try_from(id)
            .ok()?
            .checked_sub(1)
            .filter(|index| *index < len)
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
