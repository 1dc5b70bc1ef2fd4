// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in definitions and fields.
//!
//! These IDs are bytes on disk in every existing log and must never be
//! renumbered.

use super::definition::Definition;
use super::field::{DataType, FieldDefinition};

/// Built-in definition IDs
pub mod definition_ids {
    pub const TRANSACTION: u64 = 1;
    pub const FIELD: u64 = 2;
    pub const TYPE: u64 = 3;
    pub const PROJECT_META: u64 = 4;
    pub const NODE: u64 = 5;
    pub const BLOCK_BOUNDARY: u64 = 6;
    pub const SET_FIELDS: u64 = 7;
    pub const ARCHIVE: u64 = 8;

    /// Highest ID reserved for built-in semantics
    pub const LAST_RESERVED: u64 = ARCHIVE;
    /// IDs that resolve even before anything is registered
    pub const LAST_CRITICAL: u64 = TYPE;
}

/// Built-in field IDs
pub mod field_ids {
    pub const TIMESTAMP: u64 = 1;
    pub const NAME: u64 = 2;
    pub const DATA_TYPE: u64 = 3;
    pub const IMMUTABLE: u64 = 4;
    pub const INHERITED_ID: u64 = 5;
    pub const ID: u64 = 6;
    pub const DESCRIPTION: u64 = 7;
    pub const VERSION: u64 = 8;
    pub const BYTE_OFFSET: u64 = 9;
    pub const SIGNATURE: u64 = 10;
    pub const BLOCK_ID: u64 = 11;
    pub const TRANSACTION_COUNT: u64 = 12;
    pub const INVALID_TRANSACTION: u64 = 13;
    pub const PROJECT_ID: u64 = 14;
    pub const REASON: u64 = 15;
    pub const ENTITY_ID: u64 = 16;
    pub const DEFINITION_ID: u64 = 17;
    pub const FIELD_ID: u64 = 18;
    pub const PREVIOUS: u64 = 19;
    pub const OFFSET: u64 = 20;
    pub const VARIANT_TYPE_ID: u64 = 21;
    pub const NODE_ID: u64 = 22;

    pub const LAST_CRITICAL: u64 = DATA_TYPE;
}

/// `(id, name)` of every built-in definition, in registration order
pub const DEFAULT_DEFINITIONS: &[(u64, &str)] = &[
    (definition_ids::TRANSACTION, "Blockchain.Transaction"),
    (definition_ids::FIELD, "Blockchain.Field"),
    (definition_ids::TYPE, "Blockchain.Type"),
    (definition_ids::PROJECT_META, "Blockchain.ProjectMeta"),
    (definition_ids::NODE, "Blockchain.Node"),
    (definition_ids::BLOCK_BOUNDARY, "Blockchain.BlockBoundary"),
    (definition_ids::SET_FIELDS, "Blockchain.SetFields"),
    (definition_ids::ARCHIVE, "Blockchain.Archive"),
];

/// `(id, name, data type)` of every built-in field, in registration order
pub const DEFAULT_FIELDS: &[(u64, &str, DataType)] = &[
    (field_ids::TIMESTAMP, "Timestamp", DataType::UInt),
    (field_ids::NAME, "Name", DataType::String),
    (field_ids::DATA_TYPE, "DataType", DataType::UInt),
    (field_ids::IMMUTABLE, "Immutable", DataType::UInt),
    (field_ids::INHERITED_ID, "InheritedId", DataType::UInt),
    (field_ids::ID, "Id", DataType::UInt),
    (field_ids::DESCRIPTION, "Description", DataType::String),
    (field_ids::VERSION, "Version", DataType::UInt),
    (field_ids::BYTE_OFFSET, "ByteOffset", DataType::UInt),
    (field_ids::SIGNATURE, "Signature", DataType::Bytes),
    (field_ids::BLOCK_ID, "BlockId", DataType::UInt),
    (field_ids::TRANSACTION_COUNT, "TransactionCount", DataType::UInt),
    (field_ids::INVALID_TRANSACTION, "InvalidTransaction", DataType::UInt),
    (field_ids::PROJECT_ID, "ProjectId", DataType::Bytes),
    (field_ids::REASON, "Reason", DataType::String),
    (field_ids::ENTITY_ID, "EntityId", DataType::UInt),
    (field_ids::DEFINITION_ID, "DefinitionId", DataType::UInt),
    (field_ids::FIELD_ID, "FieldId", DataType::UInt),
    (field_ids::PREVIOUS, "Previous", DataType::UInt),
    (field_ids::OFFSET, "Offset", DataType::Int),
    (field_ids::VARIANT_TYPE_ID, "VariantTypeId", DataType::UInt),
    (field_ids::NODE_ID, "NodeId", DataType::UInt),
];

/// Stand-in for definitions 1..=3 while the schema is still being bootstrapped
pub fn temporary_critical_definition(id: u64) -> Option<Definition> {
    if id == 0 || id > definition_ids::LAST_CRITICAL {
        return None;
    }
    DEFAULT_DEFINITIONS
        .iter()
        .find(|(def_id, _)| *def_id == id)
        .map(|(def_id, name)| Definition::new(*def_id, *name, None, 0))
}

/// Stand-in for fields 1..=3 while the schema is still being bootstrapped
pub fn temporary_critical_field(id: u64) -> Option<FieldDefinition> {
    if id == 0 || id > field_ids::LAST_CRITICAL {
        return None;
    }
    DEFAULT_FIELDS
        .iter()
        .find(|(field_id, _, _)| *field_id == id)
        .map(|(field_id, name, data_type)| FieldDefinition::new(*field_id, *name, *data_type, 0))
}
