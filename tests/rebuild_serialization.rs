mod common;
use crate::common::{init_tracing, wait_until, with_timeout, RecordingMerger, SourceTree, TestResult};

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use tokio::sync::mpsc;

use mergewatch::engine::{Coordinator, CoordinatorCore, SessionEvent};
use mergewatch::fs::RealFileSystem;
use mergewatch::merge::Merger;
use mergewatch::watch::{ShutdownSignal, WatchOptions, WatchSession};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_changes_never_overlap_merges() -> TestResult {
    init_tracing();

    let tree = SourceTree::new()
        .with_source("a.css", "a")
        .with_source("b.css", "b")
        .with_source("c.css", "c")
        .with_source("d.css", "d");
    let out = tree.output();

    let merger = Arc::new(
        RecordingMerger::new(RealFileSystem).with_delay(Duration::from_millis(25)),
    );
    merger.merge(&tree.sources(), &out)?;

    let options = WatchOptions {
        poll_interval: Duration::from_millis(5),
        event_buffer: 64,
    };
    let session = WatchSession::new(tree.sources(), &out, options);
    let shutdown = session.shutdown_signal();
    let handle = tokio::spawn(session.run(Arc::clone(&merger)));

    sleep(Duration::from_millis(50)).await;
    for round in 0..10 {
        for index in 0..4 {
            tree.append(index, format!("/* {round} */"));
        }
        sleep(Duration::from_millis(7)).await;
    }

    let expected = tree.expected_output();
    let settled = wait_until(Duration::from_secs(4), || {
        fs::read(&out).ok().as_ref() == Some(&expected)
    })
    .await;
    assert!(settled, "final rebuild did not capture every edit");

    assert!(merger.runs() >= 2, "expected at least one rebuild, got {}", merger.runs());
    assert_eq!(merger.max_concurrent(), 1);

    shutdown.trigger();
    with_timeout(handle).await??;
    Ok(())
}

#[tokio::test]
async fn no_merge_starts_after_shutdown() -> TestResult {
    init_tracing();

    let tree = SourceTree::new().with_source("a.css", "a");
    let out = tree.output();
    let merger = Arc::new(RecordingMerger::new(RealFileSystem));

    let (tx, rx) = mpsc::channel(4);
    for _ in 0..3 {
        tx.send(SessionEvent::Changed { path: tree.source(0).to_path_buf() }).await?;
    }

    let shutdown = ShutdownSignal::new();
    shutdown.trigger();

    let coordinator = Coordinator::new(
        CoordinatorCore::new(),
        rx,
        Arc::clone(&merger),
        tree.sources().into(),
        out.clone(),
        shutdown,
    );
    with_timeout(coordinator.run()).await?;

    assert_eq!(merger.runs(), 0);
    assert!(!out.exists());
    Ok(())
}
