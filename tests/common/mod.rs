#![allow(dead_code, unused_imports)]

pub use mergewatch_test_utils::{
    init_tracing, wait_until, with_timeout, RecordingMerger, SourceTree,
};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
