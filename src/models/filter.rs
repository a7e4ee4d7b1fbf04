use serde::{Deserialize, Serialize};

use super::item::{Item, StatusKind};

/// Client-side visibility filter. An absent field matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filter {
    pub status_filter: Option<StatusKind>,
    pub node_substring: Option<String>,
}

impl Filter {
    pub fn new(status_filter: Option<StatusKind>, node_substring: Option<String>) -> Self {
        Self {
            status_filter,
            node_substring: node_substring.filter(|value| !value.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status_filter.is_none() && self.node_substring.is_none()
    }

    pub fn matches(&self, item: &Item) -> bool {
        let status_ok = self
            .status_filter
            .map(|status| status == item.status)
            .unwrap_or(true);
        let node_ok = self
            .node_substring
            .as_deref()
            .map(|needle| item.node.contains(needle))
            .unwrap_or(true);
        status_ok && node_ok
    }
}

/// Returns the items that should be visible under `filter`, in server order.
pub fn apply(items: &[Item], filter: &Filter) -> Vec<Item> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}
