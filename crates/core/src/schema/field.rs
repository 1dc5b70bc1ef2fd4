// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field definitions and their wire data types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use super::definition::{IMMUTABLE_INSTANCES, IMMUTABLE_SCHEMA};

/// Field flag: values of this field can no longer be set
pub const IMMUTABLE_VALUE: u64 = 4;

/// Wire type of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    UInt,
    Int,
    Float4,
    Float8,
    String,
    Bytes,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::UInt,
        DataType::Int,
        DataType::Float4,
        DataType::Float8,
        DataType::String,
        DataType::Bytes,
    ];

    /// Numeric code carried by the `DataType` field of a field-defining transaction
    pub fn code(self) -> u64 {
        match self {
            DataType::UInt => 1,
            DataType::Int => 2,
            DataType::Float4 => 3,
            DataType::Float8 => 4,
            DataType::String => 5,
            DataType::Bytes => 6,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Fixed payload size, or `None` when a compressed integer decides
    pub fn field_data_size(self) -> Option<usize> {
        match self {
            DataType::Float4 => Some(4),
            DataType::Float8 => Some(8),
            _ => None,
        }
    }

    /// The compressed integer is the value itself
    pub fn size_is_value(self) -> bool {
        matches!(self, DataType::UInt | DataType::Int)
    }

    /// A zero length-marker means null
    pub fn is_nullable(self) -> bool {
        matches!(self, DataType::String | DataType::Bytes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::UInt => "uint",
            DataType::Int => "int",
            DataType::Float4 => "float4",
            DataType::Float8 => "float8",
            DataType::String => "string",
            DataType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown data type: {}", s))
    }
}

/// A field kind usable on any definition
#[derive(Debug)]
pub struct FieldDefinition {
    id: u64,
    name: String,
    data_type: DataType,
    immutable: AtomicU64,
}

impl FieldDefinition {
    pub(crate) fn new(id: u64, name: impl Into<String>, data_type: DataType, immutable: u64) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            immutable: AtomicU64::new(immutable),
        }
    }

    /// Copy of this field under a new name, carrying its current flags
    pub(crate) fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(self.id, name, self.data_type, self.immutable())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn field_data_size(&self) -> Option<usize> {
        self.data_type.field_data_size()
    }

    pub fn size_is_value(&self) -> bool {
        self.data_type.size_is_value()
    }

    pub fn is_nullable(&self) -> bool {
        self.data_type.is_nullable()
    }

    pub fn immutable(&self) -> u64 {
        self.immutable.load(Ordering::Acquire)
    }

    /// Flags only ever accumulate
    pub fn add_immutable(&self, flags: u64) {
        self.immutable.fetch_or(flags, Ordering::AcqRel);
    }

    pub fn can_update_definition(&self) -> bool {
        self.immutable() & IMMUTABLE_SCHEMA == 0
    }

    pub fn can_instance(&self) -> bool {
        self.immutable() & IMMUTABLE_INSTANCES == 0
    }

    pub fn can_set(&self) -> bool {
        self.immutable() & IMMUTABLE_VALUE == 0
    }

    pub fn info(&self) -> FieldInfo {
        FieldInfo {
            id: self.id,
            name: self.name.clone(),
            data_type: self.data_type,
            immutable: self.immutable(),
        }
    }
}

/// Serializable snapshot of a field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub id: u64,
    pub name: String,
    pub data_type: DataType,
    pub immutable: u64,
}
