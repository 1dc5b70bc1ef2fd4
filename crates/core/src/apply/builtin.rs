// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping the reader performs for reserved definitions before any
//! strategy sees a transaction

use super::{ApplyError, SpecialFields};
use crate::codec::Direction;
use crate::reader::{FieldData, TransactionView};
use crate::schema::{definition_ids, field_ids, DataType, NewDefinition, Schema};

/// Per-block state carried across transactions.
///
/// A boundary closes its block: a transaction belongs to the block whose
/// boundary follows it, and the boundary carries that block's id. Read
/// forward, transactions after the last boundary are labelled with the id the
/// next boundary will carry; read backward, they are labelled 0 until a
/// boundary has been seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BlockState {
    pub current_block_id: u64,
    /// Transactions of the current block refused by bookkeeping or listed by
    /// its boundary
    pub invalid_transactions: Vec<u64>,
    /// Set when a boundary was read forward; the next transaction opens a block
    closed: bool,
}

impl BlockState {
    fn enter(&mut self, direction: Direction) {
        if direction.is_forward() && (self.closed || self.current_block_id == 0) {
            self.current_block_id += 1;
            self.invalid_transactions.clear();
            self.closed = false;
        }
    }

    fn mark_invalid(&mut self, transaction_id: u64) {
        if !self.invalid_transactions.contains(&transaction_id) {
            self.invalid_transactions.push(transaction_id);
        }
    }
}

/// Outcome of bookkeeping for one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    Valid,
    Invalid(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// Run the built-in semantics of `tx`, recording invalid transactions in `block`.
///
/// Errors are fatal; a refused transaction is reported as [`Verdict::Invalid`].
pub(crate) fn apply(tx: &TransactionView<'_>, block: &mut BlockState) -> Result<Verdict, ApplyError> {
    if tx.definition_id() != definition_ids::BLOCK_BOUNDARY {
        block.enter(tx.direction);
    }
    let verdict = match tx.definition_id() {
        definition_ids::FIELD => define_field(tx),
        definition_ids::TYPE => define_type(tx),
        definition_ids::BLOCK_BOUNDARY => {
            close_block(tx, block);
            Verdict::Valid
        }
        definition_ids::SET_FIELDS => set_fields(tx),
        definition_ids::ARCHIVE => {
            SpecialFields::scan(tx.fields).require_target("Blockchain.Archive")?;
            Verdict::Valid
        }
        id if id > definition_ids::LAST_RESERVED => create_instance(tx),
        _ => Verdict::Valid,
    };

    if let Verdict::Invalid(reason) = &verdict {
        block.mark_invalid(tx.transaction_id);
        tracing::warn!(
            transaction_id = tx.transaction_id,
            definition = tx.definition.name(),
            block_id = block.current_block_id,
            reason = reason.as_str(),
            "invalid transaction"
        );
    }
    Ok(verdict)
}

/// A boundary labels the block it closes and lists that block's invalid
/// transactions. Read forward they were already dispatched, read backward
/// they are still to come; either way the list ends up in the block state.
fn close_block(tx: &TransactionView<'_>, block: &mut BlockState) {
    let declared = tx.uint(field_ids::BLOCK_ID);
    match tx.direction {
        Direction::Forward => {
            if let Some(id) = declared {
                block.current_block_id = id;
            }
            block.closed = true;
        }
        Direction::Backward => {
            block.current_block_id = declared.unwrap_or(block.current_block_id.saturating_sub(1));
            block.invalid_transactions.clear();
        }
    }
    let listed = tx
        .find_all(field_ids::INVALID_TRANSACTION)
        .filter(|f| f.data_type() == DataType::UInt)
        .map(|f| f.numeric_value);
    for id in listed {
        block.mark_invalid(id);
    }
    tracing::debug!(
        block_id = block.current_block_id,
        invalid = block.invalid_transactions.len(),
        "block boundary"
    );
}

fn immutable_flags(tx: &TransactionView<'_>) -> u64 {
    tx.find_all(field_ids::IMMUTABLE)
        .filter(|f| f.data_type() == DataType::UInt)
        .fold(0, |flags, f| flags | f.numeric_value)
}

fn define_field(tx: &TransactionView<'_>) -> Verdict {
    let Some(name) = tx.string(field_ids::NAME).filter(|n| !n.is_empty()) else {
        return Verdict::Invalid("field definition without a Name".to_string());
    };
    let Some(code) = tx.uint(field_ids::DATA_TYPE) else {
        return Verdict::Invalid(format!("field {} has no DataType", name));
    };
    let Some(data_type) = DataType::from_code(code) else {
        return Verdict::Invalid(format!("field {} has unknown DataType {}", name, code));
    };
    let requested_id = tx.uint(field_ids::ID);
    let schema = tx.schema;

    if let Some(existing) = schema.field_by_name(&name) {
        let same_id = requested_id.map_or(true, |id| id == existing.id());
        return if same_id && existing.data_type() == data_type {
            Verdict::Valid
        } else {
            Verdict::Invalid(format!("a different field named {} already exists", name))
        };
    }
    if tx.direction.is_backward() {
        return Verdict::Invalid(format!("field {} is not in the schema", name));
    }
    if let Some(id) = requested_id {
        let next = schema.next_field_id();
        if id != next {
            return Verdict::Invalid(format!("field {} requested ID {}, next is {}", name, id, next));
        }
    }
    match schema.register_field(&name, data_type, immutable_flags(tx)) {
        Ok(_) => Verdict::Valid,
        Err(e) => Verdict::Invalid(e.to_string()),
    }
}

fn define_type(tx: &TransactionView<'_>) -> Verdict {
    let Some(name) = tx.string(field_ids::NAME).filter(|n| !n.is_empty()) else {
        return Verdict::Invalid("type definition without a Name".to_string());
    };
    let inherited_id = tx.uint(field_ids::INHERITED_ID).filter(|id| *id != 0);
    let requested_id = tx.uint(field_ids::ID);
    let schema = tx.schema;

    if let Some(existing) = schema.definition_by_name(&name) {
        let same_id = requested_id.map_or(true, |id| id == existing.id());
        return if same_id && existing.inherited_id() == inherited_id {
            Verdict::Valid
        } else {
            Verdict::Invalid(format!("a different type named {} already exists", name))
        };
    }
    if tx.direction.is_backward() {
        return Verdict::Invalid(format!("type {} is not in the schema", name));
    }
    if let Some(id) = requested_id {
        let next = schema.next_definition_id();
        if id != next {
            return Verdict::Invalid(format!("type {} requested ID {}, next is {}", name, id, next));
        }
    }
    let mut new = NewDefinition::named(name.into_owned()).immutable(immutable_flags(tx));
    if let Some(parent) = inherited_id {
        new = new.inherits(parent);
    }
    match schema.register_definition(new) {
        Ok(_) => Verdict::Valid,
        Err(e) => Verdict::Invalid(e.to_string()),
    }
}

fn set_fields(tx: &TransactionView<'_>) -> Verdict {
    let special = SpecialFields::scan(tx.fields);
    let (entity_id, definition_id) = match special.require_target("Blockchain.SetFields") {
        Ok(target) => target,
        Err(e) => return Verdict::Invalid(e.to_string()),
    };
    let user_fields = special.user_fields(tx.fields);

    if let Some(frozen) = user_fields.iter().find(|f| !f.field.can_set()) {
        return Verdict::Invalid(format!("field {} cannot be set", frozen.field.name()));
    }
    match definition_id {
        definition_ids::FIELD | definition_ids::TYPE => {
            update_schema_entry(tx, definition_id, entity_id, user_fields)
        }
        _ => match tx.schema.definition(definition_id) {
            Some(_) => Verdict::Valid,
            None => Verdict::Invalid(format!(
                "SetFields targets unknown definition {}",
                definition_id
            )),
        },
    }
}

/// SetFields aimed at a field (definition 2) or type (definition 3)
fn update_schema_entry(
    tx: &TransactionView<'_>,
    definition_id: u64,
    entity_id: u64,
    user_fields: &[FieldData],
) -> Verdict {
    let schema: &Schema = tx.schema;
    let kind = if definition_id == definition_ids::FIELD {
        "field"
    } else {
        "type"
    };
    let frozen = if definition_id == definition_ids::FIELD {
        schema.field(entity_id).map(|f| !f.can_update_definition())
    } else {
        schema.definition(entity_id).map(|d| !d.can_update_definition())
    };
    match frozen {
        None => return Verdict::Invalid(format!("{} {} does not exist", kind, entity_id)),
        Some(true) => return Verdict::Invalid(format!("{} {} is immutable", kind, entity_id)),
        Some(false) => {}
    }
    if tx.direction.is_backward() {
        return Verdict::Valid;
    }

    for field in user_fields {
        match field.id() {
            field_ids::NAME => {
                let Some(name) = tx.bytes(field) else {
                    return Verdict::Invalid(format!("{} {} cannot be renamed to null", kind, entity_id));
                };
                let name = String::from_utf8_lossy(&name).into_owned();
                let renamed = if definition_id == definition_ids::FIELD {
                    schema.rename_field(entity_id, &name).map(|_| ())
                } else {
                    schema.rename_definition(entity_id, &name).map(|_| ())
                };
                if let Err(e) = renamed {
                    return Verdict::Invalid(e.to_string());
                }
            }
            field_ids::IMMUTABLE if field.data_type() == DataType::UInt => {
                if definition_id == definition_ids::FIELD {
                    if let Some(target) = schema.field(entity_id) {
                        target.add_immutable(field.numeric_value);
                    }
                } else if let Some(target) = schema.definition(entity_id) {
                    target.add_immutable(field.numeric_value);
                }
            }
            _ => {}
        }
    }
    Verdict::Valid
}

fn create_instance(tx: &TransactionView<'_>) -> Verdict {
    if !tx.definition.can_instance() {
        return Verdict::Invalid(format!("{} cannot be instanced", tx.definition.name()));
    }
    tx.definition.record_instance(tx.timestamp_or_zero());
    Verdict::Valid
}
