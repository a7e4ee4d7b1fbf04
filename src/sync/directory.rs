use std::sync::Arc;

use tracing::{info, warn};

use crate::kv_client::KvBackend;
use crate::models::Category;
use crate::types::DashboardError;

/// One-shot listing of the categories the store holds.
pub struct CategoryDirectory {
    backend: Arc<dyn KvBackend>,
}

impl CategoryDirectory {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the category list once. No retry: the caller decides whether to call again.
    pub async fn fetch(&self) -> Result<Vec<Category>, DashboardError> {
        match self.backend.fetch_categories().await {
            Ok(categories) => {
                info!(count = categories.len(), "Fetched category list");
                Ok(categories)
            }
            Err(err) => {
                warn!(error = ?err, "Failed to fetch category list");
                Err(DashboardError::Directory(Box::new(err)))
            }
        }
    }
}

/// Category to show once the directory has loaded: the current selection when
/// the directory knows it, otherwise the first listed category.
pub fn default_category(categories: &[Category], selected: Option<&str>) -> Option<Category> {
    if let Some(selected) = selected {
        if categories.iter().any(|category| category == selected) {
            return Some(selected.to_string());
        }
    }
    categories.first().cloned()
}
