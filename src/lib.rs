// src/lib.rs

//! Run a set of named tasks concurrently, each starting only once every task
//! it waits for is done.
//!
//! The library entry point is [`engine::EngineBuilder`]: give it a
//! [`exec::TaskHandler`] and a list of [`dag::TaskSpec`]s, then `run` the
//! resulting [`engine::Engine`]. The `dagrun` binary wraps the same engine
//! around a TOML task file and a shell-command handler.

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_and_validate, TaskFile};
use crate::engine::{EngineBuilder, RunReport};
use crate::exec::ShellHandler;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - task file loading
/// - engine construction (graph validation)
/// - the shell-command handler
/// - the run summary
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config;
    let file = load_and_validate(&config_path)
        .with_context(|| format!("loading task file '{}'", config_path.display()))?;

    let working_dir = resolve_working_dir(&config_path, &file);
    let handler = ShellHandler::new(file.commands()).with_working_dir(working_dir);

    let engine = EngineBuilder::new()
        .handler(handler)
        .tasks(file.specs())
        .build()?;

    if args.dry_run {
        let layers = engine.graph().layers()?;
        print_dry_run(&file, &layers);
        return Ok(());
    }

    let report = engine.run_with_report().await;
    print_summary(&report);
    report.into_result()?;

    Ok(())
}

/// Figure out a sensible project root for running commands.
///
/// - If the task file has a non-empty parent (e.g. "ci/Dagrun.toml"), we use
///   that directory.
/// - If it's just a bare filename like "Dagrun.toml" (parent = ""), we fall
///   back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// `[config].working_dir`, resolved against the task file's directory.
fn resolve_working_dir(config_path: &Path, file: &TaskFile) -> PathBuf {
    let root = config_root_dir(config_path);
    match file.config.working_dir.as_deref() {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => root.join(dir),
        None => root,
    }
}

/// Print tasks, their dependencies, and the layers they would run in.
fn print_dry_run(file: &TaskFile, layers: &[Vec<String>]) {
    println!("dagrun dry-run");
    println!();

    println!("tasks ({}):", file.task.len());
    for (id, task) in file.task.iter() {
        println!("  - {id}");
        if let Some(ref cmd) = task.cmd {
            println!("      cmd: {cmd}");
        }
        if !task.wait_for.is_empty() {
            println!("      wait_for: {:?}", task.wait_for);
        }
        if task.skip {
            println!("      skip: true");
        }
    }
    println!();

    println!("layers:");
    for (depth, layer) in layers.iter().enumerate() {
        let names: Vec<String> = layer
            .iter()
            .map(|id| match file.task.get(id) {
                Some(tc) if tc.skip => format!("{id} (skip)"),
                _ => id.clone(),
            })
            .collect();
        println!("  {depth}: {}", names.join(", "));
    }

    debug!("dry-run complete (no execution)");
}

fn print_summary(report: &RunReport) {
    println!(
        "dagrun: {} completed, {} skipped, {} failed, {} blocked",
        report.completed.len(),
        report.skipped.len(),
        report.failed.len(),
        report.blocked.len()
    );
    if !report.failed.is_empty() {
        println!("  failed: {}", report.failed.join(", "));
    }
    if !report.blocked.is_empty() {
        println!("  blocked: {}", report.blocked.join(", "));
    }
}
