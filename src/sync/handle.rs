use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::PollTiming;
use crate::kv_client::KvBackend;
use crate::models::{Category, DashboardState, StatusKind};
use crate::types::DashboardError;

use super::directory::CategoryDirectory;
use super::engine::{Command, SyncEngine};

const COMMAND_BUFFER: usize = 32;

/// Cloneable front door to a running sync engine.
///
/// User actions become [`Command`]s sent to the engine task; snapshots flow back
/// on a watch channel. Nothing outside the engine task mutates dashboard state.
#[derive(Clone)]
pub struct Dashboard {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<Arc<DashboardState>>,
    directory: Arc<CategoryDirectory>,
}

impl Dashboard {
    /// Spawn the engine task. `initial_category` seeds the selection, e.g. from a
    /// navigation target; the directory may replace it if it does not exist.
    pub fn spawn(
        backend: Arc<dyn KvBackend>,
        timing: PollTiming,
        initial_category: Option<Category>,
    ) -> (Self, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(Arc::new(DashboardState::default()));

        let engine = SyncEngine::new(
            backend.clone(),
            timing,
            initial_category,
            command_rx,
            state_tx,
        );
        let task = tokio::spawn(engine.run());

        let dashboard = Self {
            commands: command_tx,
            state: state_rx,
            directory: Arc::new(CategoryDirectory::new(backend)),
        };
        (dashboard, task)
    }

    /// Fetch the category list once and hand it to the engine.
    /// A failed fetch is returned to the caller, who may retry.
    pub async fn load_categories(&self) -> Result<Vec<Category>, DashboardError> {
        let categories = self.directory.fetch().await?;
        self.send(Command::CategoriesLoaded(categories.clone())).await?;
        Ok(categories)
    }

    pub async fn select_category(
        &self,
        category: impl Into<Category>,
    ) -> Result<(), DashboardError> {
        self.send(Command::SelectCategory(category.into())).await
    }

    pub async fn set_status_filter(
        &self,
        status: Option<StatusKind>,
    ) -> Result<(), DashboardError> {
        self.send(Command::SetStatusFilter(status)).await
    }

    pub async fn set_node_filter(&self, node: Option<String>) -> Result<(), DashboardError> {
        self.send(Command::SetNodeFilter(node)).await
    }

    /// Terminate the engine: cancels the outstanding poll and pending timers.
    pub async fn shutdown(&self) -> Result<(), DashboardError> {
        self.send(Command::Shutdown).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardState>> {
        self.state.clone()
    }

    async fn send(&self, command: Command) -> Result<(), DashboardError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DashboardError::EngineStopped)
    }
}
