use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::PollTiming;
use crate::kv_client::KvBackend;
use crate::models::{Category, ConsistencyIndex, Item, StatusKind};
use crate::sync::{PollSession, SessionOutcome};

use super::system::invoke_pipe;

/// Remembers the worst status seen per category and reports changes.
#[derive(Debug, Default)]
pub struct StatusTracker {
    last_status: HashMap<Category, StatusKind>,
}

impl StatusTracker {
    /// Feed a full namespace snapshot. Returns the worst item of every category
    /// whose worst status changed since the previous snapshot. The first sighting
    /// of a category is only recorded.
    pub fn observe(&mut self, items: &[Item]) -> Vec<Item> {
        let mut worst: BTreeMap<&str, &Item> = BTreeMap::new();
        for item in items {
            worst
                .entry(item.category.as_str())
                .and_modify(|current| {
                    if item.status.severity() > current.status.severity() {
                        *current = item;
                    }
                })
                .or_insert(item);
        }

        let mut changed = Vec::new();
        for (category, item) in worst {
            match self.last_status.insert(category.to_string(), item.status) {
                None => {
                    info!(category = %category, status = %item.status, "Initial status");
                }
                Some(previous) if previous != item.status => {
                    info!(
                        category = %category,
                        from = %previous,
                        to = %item.status,
                        "Status changed"
                    );
                    changed.push(item.clone());
                }
                Some(_) => {}
            }
        }
        changed
    }
}

/// Long-poll the whole namespace and run `command` whenever a category's worst
/// status changes. Runs until `shutdown` is canceled.
pub async fn watch_for_trigger(
    backend: Arc<dyn KvBackend>,
    command: String,
    timing: PollTiming,
    shutdown: CancellationToken,
) {
    info!(command = %command, "Watching namespace for status changes");
    let mut tracker = StatusTracker::default();
    let mut index = ConsistencyIndex::ZERO;

    'watch: loop {
        let mut session = PollSession::start(backend.clone(), Category::new(), index);
        let outcome = tokio::select! {
            _ = shutdown.cancelled() => break,
            outcome = session.resolve() => outcome,
        };

        let delay = match outcome {
            SessionOutcome::Success { items, new_index } => {
                index = index.max(new_index);
                for item in tracker.observe(&items) {
                    // Dropping the call kills a command that is still running.
                    tokio::select! {
                        _ = shutdown.cancelled() => break 'watch,
                        _ = fire(&command, &item) => {}
                    }
                }
                timing.poll_interval
            }
            SessionOutcome::Failure { kind } => {
                warn!(error = %kind, "Namespace poll failed, backing off");
                timing.backoff_interval()
            }
            SessionOutcome::Canceled => Duration::ZERO,
        };

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(delay) => {}
        }
    }

    info!("Trigger watcher stopped");
}

async fn fire(command: &str, item: &Item) {
    let payload = match serde_json::to_vec(item) {
        Ok(payload) => payload,
        Err(err) => {
            error!(error = ?err, "Failed to encode trigger payload");
            return;
        }
    };
    if let Err(err) = invoke_pipe(command, &payload).await {
        error!(category = %item.category, error = ?err, "Trigger command failed");
    }
}
