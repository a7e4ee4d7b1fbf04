//! Scripted in-memory backend shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use kv_dashboard::kv_client::PollResponse;
use kv_dashboard::models::{Category, ConsistencyIndex, Item, StatusKind};
use kv_dashboard::{DashboardError, KvBackend};

#[derive(Debug)]
pub struct Call {
    pub category: String,
    pub index: u64,
    pub at: Instant,
}

pub enum Reply {
    Items(Vec<Item>, u64),
    ServerError,
    Hang,
}

#[derive(Default)]
pub struct Counters {
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub abandoned: AtomicUsize,
}

struct InFlight<'a> {
    counters: &'a Counters,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn enter(counters: &'a Counters) -> Self {
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self {
            counters,
            finished: false,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        if !self.finished {
            self.counters.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Answers polls from a script; once the script runs out every poll hangs.
/// A backend built without categories fails the directory fetch.
pub struct ScriptedBackend {
    categories: Option<Vec<Category>>,
    replies: Mutex<VecDeque<Reply>>,
    calls: mpsc::UnboundedSender<Call>,
    pub counters: Counters,
}

impl ScriptedBackend {
    pub fn new(
        categories: &[&str],
        replies: Vec<Reply>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Call>) {
        let categories = categories.iter().map(|c| c.to_string()).collect();
        Self::build(Some(categories), replies)
    }

    pub fn without_directory(replies: Vec<Reply>) -> (Arc<Self>, mpsc::UnboundedReceiver<Call>) {
        Self::build(None, replies)
    }

    fn build(
        categories: Option<Vec<Category>>,
        replies: Vec<Reply>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Call>) {
        let (calls, received) = mpsc::unbounded_channel();
        let backend = Arc::new(Self {
            categories,
            replies: Mutex::new(replies.into()),
            calls,
            counters: Counters::default(),
        });
        (backend, received)
    }

    pub fn abandoned(&self) -> usize {
        self.counters.abandoned.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvBackend for ScriptedBackend {
    async fn fetch_categories(&self) -> Result<Vec<Category>, DashboardError> {
        self.categories.clone().ok_or_else(|| DashboardError::Status {
            path: "/api/".to_string(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })
    }

    async fn poll_items(
        &self,
        category: &str,
        index: ConsistencyIndex,
    ) -> Result<PollResponse, DashboardError> {
        let mut guard = InFlight::enter(&self.counters);
        let _ = self.calls.send(Call {
            category: category.to_string(),
            index: index.value(),
            at: Instant::now(),
        });

        let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Hang);
        let result = match reply {
            Reply::Items(items, index) => Ok(PollResponse {
                items,
                index: ConsistencyIndex::new(index),
            }),
            Reply::ServerError => Err(DashboardError::Status {
                path: format!("/api/{category}"),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            }),
            Reply::Hang => future::pending().await,
        };
        guard.finished = true;
        result
    }
}

pub fn item(node: &str, status: StatusKind) -> Item {
    Item {
        node: node.to_string(),
        status,
        ..Default::default()
    }
}

pub fn item_in(category: &str, node: &str, status: StatusKind) -> Item {
    Item {
        category: category.to_string(),
        ..item(node, status)
    }
}

pub async fn next_call(calls: &mut mpsc::UnboundedReceiver<Call>) -> Call {
    calls.recv().await.expect("backend dropped")
}
