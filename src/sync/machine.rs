use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::PollTiming;
use crate::models::{Category, ConsistencyIndex, DashboardState, EnginePhase, Filter, StatusKind};

use super::directory::default_category;
use super::session::SessionOutcome;

/// Inputs to the sync state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CategoriesLoaded(Vec<Category>),
    SelectCategory(Category),
    SetStatusFilter(Option<StatusKind>),
    SetNodeFilter(Option<String>),
    TimerElapsed,
    SessionResolved {
        generation: u64,
        outcome: SessionOutcome,
    },
    Dispose,
}

/// Poll the driver must start now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub generation: u64,
    pub category: Category,
    pub index: ConsistencyIndex,
}

/// Side effects requested by a transition, applied by the driver in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartSession(SessionRequest),
    CancelSession,
    Schedule(Duration),
    ClearTimer,
}

/// The sync engine's state machine, free of I/O.
///
/// Every transition that changes observable state replaces the snapshot with a
/// new `Arc<DashboardState>`. Session resolutions carry the generation they were
/// issued with; any generation other than the outstanding one is stale and dropped.
pub struct SyncMachine {
    timing: PollTiming,
    state: Arc<DashboardState>,
    generation: u64,
    outstanding: Option<u64>,
}

impl SyncMachine {
    pub fn new(timing: PollTiming, initial_category: Option<Category>) -> Self {
        let state = DashboardState {
            current_category: initial_category,
            ..Default::default()
        };
        Self {
            timing,
            state: Arc::new(state),
            generation: 0,
            outstanding: None,
        }
    }

    pub fn state(&self) -> &Arc<DashboardState> {
        &self.state
    }

    pub fn phase(&self) -> EnginePhase {
        self.state.phase
    }

    /// Generation of the session the machine is waiting on, if any.
    pub fn outstanding(&self) -> Option<u64> {
        self.outstanding
    }

    /// Effects for leaving the initial `Idle` state.
    pub fn start(&mut self) -> Vec<Effect> {
        self.check_readiness()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        if self.phase() == EnginePhase::Terminated {
            debug!(?event, "Ignoring event after termination");
            return Vec::new();
        }

        match event {
            Event::CategoriesLoaded(categories) => self.on_categories_loaded(categories),
            Event::SelectCategory(category) => self.switch_category(category),
            Event::SetStatusFilter(status) => {
                self.update(|state| state.filter.status_filter = status);
                Vec::new()
            }
            Event::SetNodeFilter(node) => {
                self.update(|state| {
                    state.filter = Filter::new(state.filter.status_filter, node);
                });
                Vec::new()
            }
            Event::TimerElapsed => self.on_timer(),
            Event::SessionResolved {
                generation,
                outcome,
            } => self.on_resolved(generation, outcome),
            Event::Dispose => self.dispose(),
        }
    }

    fn on_categories_loaded(&mut self, categories: Vec<Category>) -> Vec<Effect> {
        let target = default_category(&categories, self.state.current_category.as_deref());
        self.update(|state| state.categories = categories);

        match target {
            Some(category)
                if self.state.current_category.as_deref() != Some(category.as_str()) =>
            {
                self.switch_category(category)
            }
            _ => Vec::new(),
        }
    }

    fn on_timer(&mut self) -> Vec<Effect> {
        match self.phase() {
            EnginePhase::Idle => self.check_readiness(),
            EnginePhase::Waiting => self.issue(),
            EnginePhase::BackingOff => {
                self.update(|state| state.phase = EnginePhase::Waiting);
                self.issue()
            }
            EnginePhase::Polling | EnginePhase::Terminated => Vec::new(),
        }
    }

    fn check_readiness(&mut self) -> Vec<Effect> {
        if self.state.current_category.is_some() {
            self.update(|state| state.phase = EnginePhase::Waiting);
            self.issue()
        } else {
            vec![Effect::Schedule(self.timing.idle_interval())]
        }
    }

    fn on_resolved(&mut self, generation: u64, outcome: SessionOutcome) -> Vec<Effect> {
        if self.phase() != EnginePhase::Polling || self.outstanding != Some(generation) {
            debug!(generation, "Dropping resolution of a stale session");
            return Vec::new();
        }
        self.outstanding = None;

        match outcome {
            SessionOutcome::Success { items, new_index } => {
                let index = if new_index < self.state.index {
                    warn!(
                        previous = %self.state.index,
                        returned = %new_index,
                        "Server returned an older index, keeping the previous one"
                    );
                    self.state.index
                } else {
                    new_index
                };
                self.update(|state| {
                    state.items = items;
                    state.index = index;
                    state.phase = EnginePhase::Waiting;
                    state.last_error = None;
                    state.last_synced_at = Some(Utc::now());
                });
                vec![Effect::Schedule(self.timing.poll_interval)]
            }
            SessionOutcome::Failure { kind } => {
                warn!(
                    category = ?self.state.current_category,
                    error = %kind,
                    "Poll failed, backing off"
                );
                self.update(|state| {
                    state.phase = EnginePhase::BackingOff;
                    state.last_error = Some(kind);
                });
                vec![Effect::Schedule(self.timing.backoff_interval())]
            }
            // Not a failure: re-issue right away without backoff.
            SessionOutcome::Canceled => {
                self.update(|state| state.phase = EnginePhase::Waiting);
                self.issue()
            }
        }
    }

    fn switch_category(&mut self, category: Category) -> Vec<Effect> {
        if self.state.current_category.as_deref() == Some(category.as_str())
            && self.phase() != EnginePhase::Idle
        {
            return Vec::new();
        }
        info!(
            from = ?self.state.current_category,
            to = %category,
            "Switching category"
        );

        let mut effects = Vec::new();
        if self.outstanding.take().is_some() {
            effects.push(Effect::CancelSession);
        }
        effects.push(Effect::ClearTimer);

        self.update(|state| {
            state.current_category = Some(category);
            state.index = ConsistencyIndex::ZERO;
            state.items = Vec::new();
            state.last_error = None;
            state.last_synced_at = None;
            state.phase = EnginePhase::Waiting;
        });
        effects.extend(self.issue());
        effects
    }

    fn issue(&mut self) -> Vec<Effect> {
        let Some(category) = self.state.current_category.clone() else {
            return vec![Effect::Schedule(self.timing.idle_interval())];
        };
        self.generation += 1;
        self.outstanding = Some(self.generation);
        self.update(|state| state.phase = EnginePhase::Polling);

        vec![Effect::StartSession(SessionRequest {
            generation: self.generation,
            category,
            index: self.state.index,
        })]
    }

    fn dispose(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.outstanding.take().is_some() {
            effects.push(Effect::CancelSession);
        }
        effects.push(Effect::ClearTimer);
        self.update(|state| state.phase = EnginePhase::Terminated);
        effects
    }

    fn update(&mut self, change: impl FnOnce(&mut DashboardState)) {
        let mut next = DashboardState::clone(&self.state);
        change(&mut next);
        if next != *self.state {
            self.state = Arc::new(next);
        }
    }
}
