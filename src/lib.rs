// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod merge;
pub mod serve;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{Settings, load_settings};
use crate::errors::Result;
use crate::fs::RealFileSystem;
use crate::manifest::{ensure_output_not_listed, load_manifest};
use crate::merge::{FileMerger, Merger};
use crate::watch::{ShutdownSignal, WatchSession};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config + manifest loading
/// - the initial build
/// - (optional) the content server
/// - (optional) the watch session
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = load_settings(&args)?;

    let sources = load_manifest(&RealFileSystem, &settings.list)?;
    ensure_output_not_listed(&sources, &settings.out)?;

    if args.dry_run {
        print_dry_run(&settings, &sources);
        return Ok(());
    }

    // Initial build; failure here means the session never starts.
    let merger = Arc::new(FileMerger::new(RealFileSystem));
    let stats = merger.merge(&sources, &settings.out)?;
    info!(
        sources = stats.sources,
        bytes = stats.bytes_written,
        "built {:?}",
        settings.out
    );

    if settings.watch.is_none() && settings.serve.is_none() {
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();

    // Ctrl-C → graceful shutdown.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received; shutting down");
            shutdown.trigger();
        });
    }

    let server = settings.serve.map(|addr| {
        let output = settings.out.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = serve::serve(output, addr, shutdown.clone()).await;
            if let Err(ref e) = result {
                warn!(error = %e, "server failed; shutting down");
                shutdown.trigger();
            }
            result
        })
    });

    if let Some(options) = settings.watch {
        let session = WatchSession::new(sources, settings.out.clone(), options)
            .with_shutdown(shutdown.child());

        if let Err(err) = session.run(merger).await {
            shutdown.trigger();
            if let Some(server) = server {
                match server.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "server failed during shutdown"),
                    Err(e) => warn!(error = %e, "server task did not finish cleanly"),
                }
            }
            return Err(err.into());
        }
    }

    if let Some(server) = server {
        server.await.map_err(anyhow::Error::from)??;
    }

    Ok(())
}

/// Simple dry-run output: print the resolved plan.
fn print_dry_run(settings: &Settings, sources: &[std::path::PathBuf]) {
    println!("mergewatch dry-run");
    println!("  list = {:?}", settings.list);
    println!("  out  = {:?}", settings.out);
    match settings.watch {
        Some(ref options) => println!("  watch: every {:?}", options.poll_interval),
        None => println!("  watch: off"),
    }
    match settings.serve {
        Some(addr) => println!("  serve: http://{addr}/"),
        None => println!("  serve: off"),
    }
    println!();

    println!("sources ({}):", sources.len());
    for source in sources {
        println!("  - {}", source.display());
    }

    debug!("dry-run complete (nothing written)");
}
