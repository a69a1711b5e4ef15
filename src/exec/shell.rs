// src/exec/shell.rs

//! Shell-command task handler.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::TaskName;
use crate::exec::handler::{HandlerFuture, TaskHandler};

/// Runs one shell command per task id.
///
/// Stdout lines are logged at `info`, stderr lines at `debug`. A non-zero
/// exit status is a task failure.
#[derive(Debug, Clone)]
pub struct ShellHandler {
    commands: Arc<HashMap<TaskName, String>>,
    working_dir: Option<PathBuf>,
}

impl ShellHandler {
    pub fn new(commands: HashMap<TaskName, String>) -> Self {
        Self {
            commands: Arc::new(commands),
            working_dir: None,
        }
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl TaskHandler for ShellHandler {
    fn handle(&self, task: TaskName) -> HandlerFuture {
        let cmd = self.commands.get(&task).cloned();
        let dir = self.working_dir.clone();

        Box::pin(async move {
            let Some(cmd) = cmd else {
                bail!("no command configured for task '{task}'");
            };
            run_command(&task, &cmd, dir.as_deref()).await
        })
    }
}

async fn run_command(task: &str, cmd_line: &str, dir: Option<&Path>) -> Result<()> {
    info!(task = %task, cmd = %cmd_line, "starting task process");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{task}'"))?;

    let mut readers = Vec::new();

    if let Some(stdout) = child.stdout.take() {
        let task_name = task.to_string();
        readers.push(tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "stdout: {}", line);
            }
        }));
    }

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let task_name = task.to_string();
        readers.push(tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        }));
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{task}'"))?;

    for reader in readers {
        let _ = reader.await;
    }

    let code = status.code().unwrap_or(-1);
    info!(
        task = %task,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    if !status.success() {
        bail!("command `{cmd_line}` exited with code {code}");
    }

    Ok(())
}
