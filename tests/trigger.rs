//! Namespace watcher: poll cadence, command firing and shutdown.

mod common;

use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use kv_dashboard::config::PollTiming;
use kv_dashboard::models::{Item, StatusKind};
use kv_dashboard::trigger::watch_for_trigger;

use common::{item_in, next_call, Reply, ScriptedBackend};

fn fast_timing() -> PollTiming {
    PollTiming {
        poll_interval: Duration::from_millis(10),
        ..PollTiming::default()
    }
}

async fn wait_for_file(path: &Path, complete: impl Fn(&str) -> bool) -> String {
    for _ in 0..250 {
        if let Ok(contents) = tokio::fs::read_to_string(path).await {
            if complete(&contents) {
                return contents;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{} never appeared", path.display());
}

#[tokio::test(start_paused = true)]
async fn forwards_index_and_backs_off_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fired");
    let healthy = vec![item_in("prod", "db1", StatusKind::Success)];
    let (backend, mut calls) = ScriptedBackend::new(
        &[],
        vec![
            Reply::Items(healthy.clone(), 5),
            Reply::ServerError,
            Reply::Items(healthy, 9),
        ],
    );
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(watch_for_trigger(
        backend.clone(),
        format!("touch '{}'", marker.display()),
        PollTiming::default(),
        shutdown.clone(),
    ));

    let first = next_call(&mut calls).await;
    assert_eq!((first.category.as_str(), first.index), ("", 0));

    let failed = next_call(&mut calls).await;
    assert_eq!(failed.index, 5);
    assert_eq!(failed.at - first.at, Duration::from_secs(1));

    let retried = next_call(&mut calls).await;
    assert_eq!(retried.index, 5);
    assert_eq!(retried.at - failed.at, Duration::from_secs(5));

    let next = next_call(&mut calls).await;
    assert_eq!(next.index, 9);
    assert_eq!(next.at - retried.at, Duration::from_secs(1));

    shutdown.cancel();
    task.await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(backend.abandoned(), 1);
    assert!(!marker.exists());
}

#[tokio::test]
async fn status_change_pipes_worst_item_to_command() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("payload.json");
    let (backend, _calls) = ScriptedBackend::new(
        &[],
        vec![
            Reply::Items(
                vec![
                    item_in("prod", "db1", StatusKind::Success),
                    item_in("staging", "web1", StatusKind::Success),
                ],
                1,
            ),
            Reply::Items(
                vec![
                    item_in("prod", "db1", StatusKind::Warning),
                    item_in("prod", "db2", StatusKind::Danger),
                    item_in("staging", "web1", StatusKind::Success),
                ],
                2,
            ),
        ],
    );
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(watch_for_trigger(
        backend,
        format!("cat > '{}'", out.display()),
        fast_timing(),
        shutdown.clone(),
    ));

    let payload: Item = serde_json::from_str(
        &wait_for_file(&out, |contents| serde_json::from_str::<Item>(contents).is_ok()).await,
    )
    .unwrap();
    assert_eq!(payload, item_in("prod", "db2", StatusKind::Danger));

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(3), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn shutdown_stops_watcher_while_command_runs() {
    let dir = tempfile::tempdir().unwrap();
    let started = dir.path().join("started");
    let (backend, _calls) = ScriptedBackend::new(
        &[],
        vec![
            Reply::Items(vec![item_in("prod", "db1", StatusKind::Success)], 1),
            Reply::Items(vec![item_in("prod", "db1", StatusKind::Danger)], 2),
        ],
    );
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(watch_for_trigger(
        backend,
        format!("printf started > '{}' && exec sleep 20", started.display()),
        fast_timing(),
        shutdown.clone(),
    ));

    wait_for_file(&started, |contents| contents == "started").await;
    shutdown.cancel();

    let stopped = tokio::time::timeout(Duration::from_secs(3), task).await;
    assert!(stopped.is_ok(), "watcher kept running after shutdown");
}
