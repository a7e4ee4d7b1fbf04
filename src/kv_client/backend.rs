use async_trait::async_trait;

use crate::models::{Category, ConsistencyIndex};
use crate::types::DashboardError;

use super::api::PollResponse;

/// The remote store as seen by the sync engine.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// One-shot listing of category names.
    async fn fetch_categories(&self) -> Result<Vec<Category>, DashboardError>;

    /// Blocking query for the items of `category` newer than `index`.
    /// An empty category names the whole namespace.
    async fn poll_items(
        &self,
        category: &str,
        index: ConsistencyIndex,
    ) -> Result<PollResponse, DashboardError>;
}
