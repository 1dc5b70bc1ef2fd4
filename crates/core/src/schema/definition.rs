// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record kinds registered in the schema

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Definition flag: the schema-defining fields are frozen
pub const IMMUTABLE_SCHEMA: u64 = 1;
/// Definition flag: no new instances may be created
pub const IMMUTABLE_INSTANCES: u64 = 2;

/// A registered record kind.
///
/// Shared as `Arc<Definition>`; the flags and the last instance timestamp are
/// atomics so updates from the log are visible to every holder.
#[derive(Debug)]
pub struct Definition {
    id: u64,
    inherited_id: Option<u64>,
    name: String,
    immutable: AtomicU64,
    last_instance_timestamp: AtomicU64,
}

impl Definition {
    pub(crate) fn new(
        id: u64,
        name: impl Into<String>,
        inherited_id: Option<u64>,
        immutable: u64,
    ) -> Self {
        Self {
            id,
            inherited_id,
            name: name.into(),
            immutable: AtomicU64::new(immutable),
            last_instance_timestamp: AtomicU64::new(0),
        }
    }

    /// Copy of this definition under a new name, carrying its flags and
    /// last instance timestamp
    pub(crate) fn renamed(&self, name: impl Into<String>) -> Self {
        let definition = Self::new(self.id, name, self.inherited_id, self.immutable());
        definition.record_instance(self.last_instance_timestamp());
        definition
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn inherited_id(&self) -> Option<u64> {
        self.inherited_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn immutable(&self) -> u64 {
        self.immutable.load(Ordering::Acquire)
    }

    /// Flags only ever accumulate
    pub fn add_immutable(&self, flags: u64) {
        self.immutable.fetch_or(flags, Ordering::AcqRel);
    }

    pub fn can_instance(&self) -> bool {
        self.immutable() & IMMUTABLE_INSTANCES == 0
    }

    pub fn can_update_definition(&self) -> bool {
        self.immutable() & IMMUTABLE_SCHEMA == 0
    }

    pub fn last_instance_timestamp(&self) -> u64 {
        self.last_instance_timestamp.load(Ordering::Acquire)
    }

    /// Record that an instance was created at `timestamp`.
    ///
    /// Keeps the newest value, so replaying out of order never moves it back.
    pub fn record_instance(&self, timestamp: u64) {
        self.last_instance_timestamp
            .fetch_max(timestamp, Ordering::AcqRel);
    }

    /// Whether an instance was created after `timestamp`
    pub fn modified_since(&self, timestamp: u64) -> bool {
        self.last_instance_timestamp() > timestamp
    }

    pub fn info(&self) -> DefinitionInfo {
        DefinitionInfo {
            id: self.id,
            name: self.name.clone(),
            inherited_id: self.inherited_id,
            immutable: self.immutable(),
            last_instance_timestamp: self.last_instance_timestamp(),
        }
    }
}

/// Serializable snapshot of a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionInfo {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_id: Option<u64>,
    pub immutable: u64,
    pub last_instance_timestamp: u64,
}
