// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoded fields and the per-transaction view handed to appliers

use crate::codec::{zigzag_decode, Direction};
use crate::pool::{BufferChain, ValueSpan};
use crate::schema::{field_ids, DataType, Definition, FieldDefinition, Schema};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// One field occurrence in the transaction being decoded
#[derive(Debug, Clone)]
pub struct FieldData {
    pub field: Arc<FieldDefinition>,
    /// The value for `uint`/`int`, the length-marker for `string`/`bytes`
    pub numeric_value: u64,
    /// Where the payload lives in the reader's buffer chain
    pub span: Option<ValueSpan>,
    pub is_null: bool,
}

impl FieldData {
    pub fn id(&self) -> u64 {
        self.field.id()
    }

    pub fn data_type(&self) -> DataType {
        self.field.data_type()
    }
}

/// An owned field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    UInt(u64),
    Int(i64),
    Float4(f32),
    Float8(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value may be written to a field of `data_type`
    pub fn fits(&self, data_type: DataType) -> bool {
        match self {
            Value::Null => data_type.is_nullable(),
            Value::UInt(_) => data_type == DataType::UInt,
            Value::Int(_) => data_type == DataType::Int,
            Value::Float4(_) => data_type == DataType::Float4,
            Value::Float8(_) => data_type == DataType::Float8,
            Value::String(_) => data_type == DataType::String,
            Value::Bytes(_) => data_type == DataType::Bytes,
        }
    }

    /// Parse the textual form of a value of `data_type` (`null` for nullable types)
    pub fn parse(data_type: DataType, text: &str) -> Result<Self, String> {
        if data_type.is_nullable() && text == "null" {
            return Ok(Value::Null);
        }
        let invalid = |e: &dyn fmt::Display| format!("invalid {} value {:?}: {}", data_type, text, e);
        match data_type {
            DataType::UInt => text.parse().map(Value::UInt).map_err(|e| invalid(&e)),
            DataType::Int => text.parse().map(Value::Int).map_err(|e| invalid(&e)),
            DataType::Float4 => text.parse().map(Value::Float4).map_err(|e| invalid(&e)),
            DataType::Float8 => text.parse().map(Value::Float8).map_err(|e| invalid(&e)),
            DataType::String => Ok(Value::String(text.to_string())),
            DataType::Bytes => parse_hex(text).map(Value::Bytes).ok_or_else(|| {
                format!("invalid bytes value {:?}: expected hex digits", text)
            }),
        }
    }
}

fn parse_hex(text: &str) -> Option<Vec<u8>> {
    let text = text.strip_prefix("0x").unwrap_or(text);
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float4(v) => write!(f, "{}", v),
            Value::Float8(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// Read-only view of a fully decoded transaction.
///
/// Borrowed from the reader; field payloads are only valid until the
/// completion callback returns.
#[derive(Clone, Copy)]
pub struct TransactionView<'a> {
    pub transaction_id: u64,
    /// Byte offset of the first byte of the transaction
    pub offset: u64,
    /// Encoded size in bytes
    pub length: u64,
    pub definition: &'a Arc<Definition>,
    pub fields: &'a [FieldData],
    /// Value of the first `Timestamp` field
    pub timestamp: Option<u64>,
    pub current_block_id: u64,
    pub direction: Direction,
    /// False when built-in bookkeeping marked the transaction invalid
    pub valid: bool,
    pub schema: &'a Schema,
    pub(crate) chain: &'a BufferChain,
}

impl<'a> TransactionView<'a> {
    pub fn definition_id(&self) -> u64 {
        self.definition.id()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// First occurrence of `field_id`
    pub fn find(&self, field_id: u64) -> Option<&'a FieldData> {
        let fields: &'a [FieldData] = self.fields;
        fields.iter().find(|f| f.id() == field_id)
    }

    /// Every occurrence of `field_id`, in log order
    pub fn find_all(&self, field_id: u64) -> impl Iterator<Item = &'a FieldData> + 'a {
        let fields: &'a [FieldData] = self.fields;
        fields.iter().filter(move |f| f.id() == field_id)
    }

    /// Numeric value of the first `uint` occurrence of `field_id`
    pub fn uint(&self, field_id: u64) -> Option<u64> {
        self.find(field_id)
            .filter(|f| f.data_type() == DataType::UInt)
            .map(|f| f.numeric_value)
    }

    /// Text of the first non-null `string` occurrence of `field_id`
    pub fn string(&self, field_id: u64) -> Option<Cow<'a, str>> {
        let field = self
            .find(field_id)
            .filter(|f| f.data_type() == DataType::String)?;
        match self.bytes(field)? {
            Cow::Borrowed(bytes) => Some(String::from_utf8_lossy(bytes)),
            Cow::Owned(bytes) => Some(Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())),
        }
    }

    /// Raw payload of a field, `None` for null and integer fields
    pub fn bytes(&self, field: &FieldData) -> Option<Cow<'a, [u8]>> {
        if field.is_null {
            return None;
        }
        let chain: &'a BufferChain = self.chain;
        field.span.as_ref().map(|span| chain.read(span))
    }

    /// Materialize a field value
    pub fn value(&self, field: &FieldData) -> Value {
        if field.is_null {
            return Value::Null;
        }
        match field.data_type() {
            DataType::UInt => Value::UInt(field.numeric_value),
            DataType::Int => Value::Int(zigzag_decode(field.numeric_value)),
            DataType::Float4 => {
                let bytes = self.bytes(field).unwrap_or_default();
                match <[u8; 4]>::try_from(&*bytes) {
                    Ok(raw) => Value::Float4(f32::from_le_bytes(raw)),
                    Err(_) => Value::Bytes(bytes.into_owned()),
                }
            }
            DataType::Float8 => {
                let bytes = self.bytes(field).unwrap_or_default();
                match <[u8; 8]>::try_from(&*bytes) {
                    Ok(raw) => Value::Float8(f64::from_le_bytes(raw)),
                    Err(_) => Value::Bytes(bytes.into_owned()),
                }
            }
            DataType::String => {
                let bytes = self.bytes(field).unwrap_or_default();
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }
            DataType::Bytes => Value::Bytes(self.bytes(field).unwrap_or_default().into_owned()),
        }
    }

    /// `(field id, value)` for every field, in log order
    pub fn values(&self) -> Vec<(u64, Value)> {
        self.fields.iter().map(|f| (f.id(), self.value(f))).collect()
    }

    /// The caller-visible timestamp, falling back to zero
    pub fn timestamp_or_zero(&self) -> u64 {
        self.timestamp.unwrap_or(0)
    }

    pub(crate) fn first_timestamp(fields: &[FieldData]) -> Option<u64> {
        fields
            .iter()
            .find(|f| f.id() == field_ids::TIMESTAMP)
            .map(|f| f.numeric_value)
    }
}

impl fmt::Debug for TransactionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionView")
            .field("transaction_id", &self.transaction_id)
            .field("definition", &self.definition.name())
            .field("field_count", &self.fields.len())
            .field("timestamp", &self.timestamp)
            .field("valid", &self.valid)
            .finish()
    }
}

/// What the completion callback receives for each transaction
#[derive(Debug)]
pub struct Completed<'a, T> {
    pub view: TransactionView<'a>,
    /// Object produced by the applier, if any
    pub relevant_object: Option<T>,
}

impl<'a, T> Deref for Completed<'a, T> {
    type Target = TransactionView<'a>;

    fn deref(&self) -> &Self::Target {
        &self.view
    }
}
