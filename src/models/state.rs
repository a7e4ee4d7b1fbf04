use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::FailureKind;

use super::filter::{self, Filter};
use super::item::{Category, Item};

/// Blocking-query token: "as of which change" a snapshot was taken.
/// Scoped to a single category; zero means no prior knowledge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConsistencyIndex(u64);

impl ConsistencyIndex {
    pub const ZERO: ConsistencyIndex = ConsistencyIndex(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConsistencyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the sync engine is in its poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnginePhase {
    /// No category selected yet.
    #[default]
    Idle,
    /// Category selected, next poll is scheduled.
    Waiting,
    /// One poll session is outstanding.
    Polling,
    /// The last poll failed; retry is scheduled.
    BackingOff,
    /// Engine disposed.
    Terminated,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnginePhase::Idle => "idle",
            EnginePhase::Waiting => "waiting",
            EnginePhase::Polling => "polling",
            EnginePhase::BackingOff => "backing off",
            EnginePhase::Terminated => "terminated",
        };
        f.write_str(label)
    }
}

/// Immutable snapshot published by the sync engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    pub current_category: Option<Category>,
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub index: ConsistencyIndex,
    pub filter: Filter,
    pub phase: EnginePhase,
    pub last_error: Option<FailureKind>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn visible_items(&self) -> Vec<Item> {
        filter::apply(&self.items, &self.filter)
    }
}
