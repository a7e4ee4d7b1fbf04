use crate::models::{ConsistencyIndex, Item};

/// Result of one completed blocking query.
#[derive(Debug, Clone, PartialEq)]
pub struct PollResponse {
    pub items: Vec<Item>,
    pub index: ConsistencyIndex,
}
