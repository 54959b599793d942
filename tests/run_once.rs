mod common;
use crate::common::{init_tracing, SourceTree, TestResult};

use std::fs;

use mergewatch::cli::CliArgs;
use mergewatch::errors::MergewatchError;
use mergewatch::run;

#[tokio::test]
async fn run_without_watch_or_serve_builds_once() -> TestResult {
    init_tracing();

    let tree = SourceTree::new()
        .with_source("first.css", "one\n")
        .with_source("second.css", "two\n")
        .with_source("third.css", "three\n");
    let args = CliArgs {
        list: Some(tree.write_manifest()),
        out: Some(tree.output()),
        ..Default::default()
    };

    run(args).await?;

    assert_eq!(fs::read(tree.output())?, b"one\ntwo\nthree\n");
    Ok(())
}

#[tokio::test]
async fn dry_run_writes_nothing() -> TestResult {
    init_tracing();

    let tree = SourceTree::new().with_source("a.css", "a");
    let args = CliArgs {
        list: Some(tree.write_manifest()),
        out: Some(tree.output()),
        dry_run: true,
        ..Default::default()
    };

    run(args).await?;

    assert!(!tree.output().exists());
    Ok(())
}

#[tokio::test]
async fn initial_merge_failure_is_reported() -> TestResult {
    init_tracing();

    let tree = SourceTree::new()
        .with_source("a.css", "a")
        .with_source("b.css", "b");
    let manifest = tree.write_manifest();
    tree.remove(1);
    let args = CliArgs {
        list: Some(manifest),
        out: Some(tree.output()),
        watch: true,
        ..Default::default()
    };

    match run(args).await {
        Err(MergewatchError::Merge(err)) => assert_eq!(err.path(), tree.source(1)),
        other => panic!("expected merge error, got {other:?}"),
    }
    Ok(())
}
