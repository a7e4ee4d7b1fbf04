use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::kv_client::{KvBackend, PollResponse};
use crate::models::{Category, ConsistencyIndex, Item};
use crate::types::FailureKind;

/// How a poll session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Success {
        items: Vec<Item>,
        new_index: ConsistencyIndex,
    },
    Failure {
        kind: FailureKind,
    },
    Canceled,
}

/// Exactly one outstanding blocking query.
///
/// The request runs on its own task and hands its result over a oneshot. The
/// session owns the cancellation token and checks it before reporting anything,
/// so once [`PollSession::cancel`] has returned, [`PollSession::resolve`] can
/// only yield [`SessionOutcome::Canceled`], whatever the network did meanwhile.
pub struct PollSession {
    requested_index: ConsistencyIndex,
    token: CancellationToken,
    outcome: Option<oneshot::Receiver<Result<PollResponse, FailureKind>>>,
}

impl PollSession {
    /// Start a blocking query for `category` at `index`.
    pub fn start(
        backend: Arc<dyn KvBackend>,
        category: Category,
        index: ConsistencyIndex,
    ) -> Self {
        let token = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let task_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                // Dropping the request future aborts the underlying HTTP call.
                _ = task_token.cancelled() => {
                    debug!(category = %category, index = %index, "Poll aborted");
                }
                result = backend.poll_items(&category, index) => {
                    let _ = tx.send(result.map_err(|err| err.failure_kind()));
                }
            }
        });

        Self {
            requested_index: index,
            token,
            outcome: Some(rx),
        }
    }

    pub fn requested_index(&self) -> ConsistencyIndex {
        self.requested_index
    }

    /// Cancel the session. Terminal: no success or failure is reported afterwards.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the session to end. Cancel-safe; reports `Canceled` once the
    /// session has been canceled or after its outcome was already taken.
    pub async fn resolve(&mut self) -> SessionOutcome {
        let Some(rx) = self.outcome.as_mut() else {
            return SessionOutcome::Canceled;
        };

        let received = tokio::select! {
            biased;
            _ = self.token.cancelled() => return SessionOutcome::Canceled,
            received = rx => received,
        };
        self.outcome = None;

        if self.token.is_cancelled() {
            return SessionOutcome::Canceled;
        }

        match received {
            Ok(Ok(response)) => SessionOutcome::Success {
                items: response.items,
                new_index: response.index,
            },
            Ok(Err(kind)) => SessionOutcome::Failure { kind },
            // The task only drops its sender without sending when it was canceled.
            Err(_) => SessionOutcome::Canceled,
        }
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
