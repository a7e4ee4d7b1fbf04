use std::future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Sleep};
use tracing::{debug, info};

use crate::config::PollTiming;
use crate::kv_client::KvBackend;
use crate::models::{Category, DashboardState, EnginePhase, StatusKind};

use super::machine::{Effect, Event, SyncMachine};
use super::session::{PollSession, SessionOutcome};

/// User actions delivered to the engine task.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CategoriesLoaded(Vec<Category>),
    SelectCategory(Category),
    SetStatusFilter(Option<StatusKind>),
    SetNodeFilter(Option<String>),
    Shutdown,
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        match command {
            Command::CategoriesLoaded(categories) => Event::CategoriesLoaded(categories),
            Command::SelectCategory(category) => Event::SelectCategory(category),
            Command::SetStatusFilter(status) => Event::SetStatusFilter(status),
            Command::SetNodeFilter(node) => Event::SetNodeFilter(node),
            Command::Shutdown => Event::Dispose,
        }
    }
}

struct ActiveSession {
    generation: u64,
    session: PollSession,
}

enum Wake {
    Command(Option<Command>),
    Resolved(u64, SessionOutcome),
    TimerFired,
}

/// Drives a [`SyncMachine`]: owns the single outstanding poll session and the
/// single pending timer, and publishes every new snapshot.
pub struct SyncEngine {
    machine: SyncMachine,
    backend: Arc<dyn KvBackend>,
    commands: mpsc::Receiver<Command>,
    publisher: watch::Sender<Arc<DashboardState>>,
    session: Option<ActiveSession>,
    timer: Option<Pin<Box<Sleep>>>,
}

impl SyncEngine {
    pub fn new(
        backend: Arc<dyn KvBackend>,
        timing: PollTiming,
        initial_category: Option<Category>,
        commands: mpsc::Receiver<Command>,
        publisher: watch::Sender<Arc<DashboardState>>,
    ) -> Self {
        Self {
            machine: SyncMachine::new(timing, initial_category),
            backend,
            commands,
            publisher,
            session: None,
            timer: None,
        }
    }

    /// Run until shut down or until every command sender is gone.
    pub async fn run(mut self) {
        let effects = self.machine.start();
        self.apply(effects);

        while self.machine.phase() != EnginePhase::Terminated {
            let wake = tokio::select! {
                command = self.commands.recv() => Wake::Command(command),
                (generation, outcome) = next_resolution(&mut self.session) => {
                    Wake::Resolved(generation, outcome)
                }
                _ = next_timer(&mut self.timer) => Wake::TimerFired,
            };

            let event = match wake {
                Wake::Command(Some(command)) => Event::from(command),
                Wake::Command(None) => Event::Dispose,
                Wake::Resolved(generation, outcome) => {
                    self.session = None;
                    Event::SessionResolved {
                        generation,
                        outcome,
                    }
                }
                Wake::TimerFired => {
                    self.timer = None;
                    Event::TimerElapsed
                }
            };

            let effects = self.machine.handle(event);
            self.apply(effects);
        }

        info!("Sync engine stopped");
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartSession(request) => {
                    if let Some(previous) = self.session.take() {
                        previous.session.cancel();
                    }
                    debug!(
                        generation = request.generation,
                        category = %request.category,
                        index = %request.index,
                        "Starting poll session"
                    );
                    self.session = Some(ActiveSession {
                        generation: request.generation,
                        session: PollSession::start(
                            self.backend.clone(),
                            request.category,
                            request.index,
                        ),
                    });
                }
                Effect::CancelSession => {
                    if let Some(active) = self.session.take() {
                        active.session.cancel();
                    }
                }
                Effect::Schedule(delay) => {
                    self.timer = Some(Box::pin(sleep(delay)));
                }
                Effect::ClearTimer => {
                    self.timer = None;
                }
            }
        }

        let state = self.machine.state().clone();
        let changed = !Arc::ptr_eq(&state, &*self.publisher.borrow());
        if changed {
            self.publisher.send_replace(state);
        }
    }
}

async fn next_resolution(session: &mut Option<ActiveSession>) -> (u64, SessionOutcome) {
    match session {
        Some(active) => {
            let generation = active.generation;
            (generation, active.session.resolve().await)
        }
        None => future::pending().await,
    }
}

async fn next_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(delay) => delay.as_mut().await,
        None => future::pending().await,
    }
}
