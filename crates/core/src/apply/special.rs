// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Special fields zone of SetFields and Archive transactions

use super::ApplyError;
use crate::reader::FieldData;
use crate::schema::{field_ids, DataType};

/// Targeting fields that precede the first `Timestamp`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialFields {
    pub entity_id: Option<u64>,
    pub definition_id: Option<u64>,
    pub variant_type_id: Option<u64>,
    pub timestamp: Option<u64>,
    /// Index of the first field after the special zone and its `Timestamp`
    pub start_fields_offset: usize,
}

impl SpecialFields {
    /// Scan `fields` up to and including the first `Timestamp`.
    ///
    /// Without a `Timestamp` every field belongs to the zone.
    pub fn scan(fields: &[FieldData]) -> Self {
        let mut special = SpecialFields {
            start_fields_offset: fields.len(),
            ..Default::default()
        };
        for (index, field) in fields.iter().enumerate() {
            if field.is_null || field.data_type() != DataType::UInt {
                continue;
            }
            let value = Some(field.numeric_value);
            match field.id() {
                field_ids::TIMESTAMP => {
                    special.timestamp = value;
                    special.start_fields_offset = index + 1;
                    break;
                }
                field_ids::ENTITY_ID => special.entity_id = value,
                field_ids::DEFINITION_ID => special.definition_id = value,
                field_ids::VARIANT_TYPE_ID => special.variant_type_id = value,
                _ => {}
            }
        }
        special
    }

    /// Fields that follow the special zone
    pub fn user_fields<'f>(&self, fields: &'f [FieldData]) -> &'f [FieldData] {
        fields.get(self.start_fields_offset..).unwrap_or_default()
    }

    /// `(entity id, definition id)` or the error naming the first missing one
    pub fn require_target(&self, definition: &'static str) -> Result<(u64, u64), ApplyError> {
        let entity_id = self.entity_id.ok_or(ApplyError::MissingSpecialField {
            definition,
            field: "EntityId",
        })?;
        let definition_id = self.definition_id.ok_or(ApplyError::MissingSpecialField {
            definition,
            field: "DefinitionId",
        })?;
        Ok((entity_id, definition_id))
    }
}
