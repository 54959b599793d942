mod common;
use crate::common::{init_tracing, SourceTree, TestResult};

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use mergewatch::cli::CliArgs;
use mergewatch::config::{load_from_path, load_settings, RawConfigFile, Settings};
use mergewatch::errors::MergewatchError;
use mergewatch::fs::mock::MockFileSystem;
use mergewatch::fs::RealFileSystem;
use mergewatch::manifest::{ensure_output_not_listed, load_manifest};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn toml_file_is_resolved_into_settings() -> TestResult {
    init_tracing();

    let file = config_file(
        r#"
[merge]
list = "list.json"
out = "merged.css"

[watch]
enabled = true
poll_interval_ms = 20

[serve]
port = 8080
"#,
    );

    let settings = Settings::try_from(load_from_path(file.path())?)?;

    assert_eq!(settings.list, PathBuf::from("list.json"));
    assert_eq!(settings.out, PathBuf::from("merged.css"));
    let watch = settings.watch.expect("watch enabled");
    assert_eq!(watch.poll_interval, Duration::from_millis(20));
    assert_eq!(watch.event_buffer, 16);
    assert_eq!(settings.serve, Some("127.0.0.1:8080".parse::<SocketAddr>()?));
    Ok(())
}

#[test]
fn cli_flags_override_the_file() -> TestResult {
    init_tracing();

    let file = config_file(
        r#"
[merge]
list = "from-file.json"
out = "from-file.css"
"#,
    );
    let args = CliArgs {
        config: Some(file.path().to_path_buf()),
        out: Some(PathBuf::from("cli.css")),
        watch: true,
        serve: Some(9000),
        bind: Some("0.0.0.0".to_string()),
        ..Default::default()
    };

    let settings = load_settings(&args)?;

    assert_eq!(settings.list, PathBuf::from("from-file.json"));
    assert_eq!(settings.out, PathBuf::from("cli.css"));
    assert_eq!(
        settings.watch.map(|w| w.poll_interval),
        Some(Duration::from_millis(50))
    );
    assert_eq!(settings.serve, Some("0.0.0.0:9000".parse::<SocketAddr>()?));
    Ok(())
}

#[test]
fn defaults_disable_watch_and_serve() -> TestResult {
    let args = CliArgs {
        list: Some(PathBuf::from("list.json")),
        out: Some(PathBuf::from("out.css")),
        ..Default::default()
    };

    let settings = load_settings(&args)?;

    assert!(settings.watch.is_none());
    assert!(settings.serve.is_none());
    Ok(())
}

#[test]
fn missing_output_is_a_config_error() {
    let mut raw = RawConfigFile::default();
    raw.merge.list = Some(PathBuf::from("list.json"));

    match Settings::try_from(raw) {
        Err(MergewatchError::ConfigError(msg)) => assert!(msg.contains("out")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn zero_poll_interval_is_rejected() {
    let args = CliArgs {
        list: Some(PathBuf::from("list.json")),
        out: Some(PathBuf::from("out.css")),
        watch: true,
        poll_interval_ms: Some(0),
        ..Default::default()
    };

    match load_settings(&args) {
        Err(MergewatchError::ConfigError(msg)) => assert!(msg.contains("poll_interval_ms")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn invalid_bind_address_is_rejected() {
    let args = CliArgs {
        list: Some(PathBuf::from("list.json")),
        out: Some(PathBuf::from("out.css")),
        serve: Some(8080),
        bind: Some("not-an-ip".to_string()),
        ..Default::default()
    };

    assert!(matches!(
        load_settings(&args),
        Err(MergewatchError::ConfigError(_))
    ));
}

#[test]
fn unknown_keys_are_rejected() {
    let file = config_file("[merge]\nlsit = \"typo.json\"\n");

    assert!(matches!(
        load_from_path(file.path()),
        Err(MergewatchError::TomlError(_))
    ));
}

#[test]
fn manifest_preserves_order() -> TestResult {
    init_tracing();

    let tree = SourceTree::new()
        .with_source("z.css", "z")
        .with_source("a.css", "a")
        .with_source("m.css", "m");
    let manifest = tree.write_manifest();

    let sources = load_manifest(&RealFileSystem, &manifest)?;

    assert_eq!(sources, tree.sources());
    Ok(())
}

#[test]
fn empty_manifest_is_valid() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("list.json", "[]");

    let sources = load_manifest(&fs, &PathBuf::from("list.json"))?;

    assert!(sources.is_empty());
    Ok(())
}

#[test]
fn malformed_manifest_names_the_manifest() {
    let fs = MockFileSystem::new();
    fs.add_file("list.json", "{\"not\": \"a list\"}");

    match load_manifest(&fs, &PathBuf::from("list.json")) {
        Err(MergewatchError::Manifest { path, reason }) => {
            assert_eq!(path, PathBuf::from("list.json"));
            assert!(reason.contains("malformed"));
        }
        other => panic!("expected Manifest error, got {other:?}"),
    }
}

#[test]
fn unreadable_manifest_is_a_manifest_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope.json");

    let err = load_manifest(&RealFileSystem, &missing).unwrap_err();

    match err {
        MergewatchError::Manifest { path, reason } => {
            assert_eq!(path, missing);
            assert!(reason.contains("cannot read"));
        }
        other => panic!("expected Manifest error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn output_listed_as_source_is_rejected() {
    let sources = vec![PathBuf::from("a.css"), PathBuf::from("out.css")];

    assert!(ensure_output_not_listed(&sources, &PathBuf::from("out.css")).is_err());
    assert!(ensure_output_not_listed(&sources, &PathBuf::from("other.css")).is_ok());
}

#[test]
fn output_alias_of_a_source_is_rejected() -> TestResult {
    let sources = vec![PathBuf::from("a.css"), PathBuf::from("merged.css")];

    assert!(ensure_output_not_listed(&sources, &PathBuf::from("./merged.css")).is_err());
    assert!(ensure_output_not_listed(&sources, &PathBuf::from("styles/../merged.css")).is_err());

    let absolute = std::env::current_dir()?.join("merged.css");
    assert!(ensure_output_not_listed(&sources, &absolute).is_err());

    let absolute_sources = vec![std::env::current_dir()?.join("./a.css")];
    assert!(ensure_output_not_listed(&absolute_sources, &PathBuf::from("a.css")).is_err());
    assert!(ensure_output_not_listed(&absolute_sources, &PathBuf::from("sub/a.css")).is_ok());
    Ok(())
}
