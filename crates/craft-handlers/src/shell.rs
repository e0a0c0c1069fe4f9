//! `shell` handler: open documents and URLs, run commands.

use std::{error::Error as StdError, io, path::PathBuf, process::Stdio};

use craft_bridge::{Context, Error, Handler, Replier, Result, parse_data};
use serde::{Deserialize, Serialize};
use tokio::{process::Command, runtime::Handle};
use tracing::{debug, warn};

/// Launcher that opens a URL or path with its default application.
const OPENER: &str = if cfg!(target_os = "macos") {
    "open"
} else {
    "xdg-open"
};

/// `open` payload.
#[derive(Deserialize)]
struct OpenData {
    /// URL or path.
    target: String,
}

/// `exec` payload.
#[derive(Debug, Deserialize)]
struct ExecData {
    /// Program to run (looked up on `PATH`).
    command: String,
    /// Arguments.
    #[serde(default)]
    args: Vec<String>,
    /// Working directory.
    #[serde(default)]
    cwd: Option<PathBuf>,
}

/// Result of `exec`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// Run `req` to completion and capture its output.
async fn exec(req: ExecData) -> io::Result<ExecOutput> {
    let mut cmd = Command::new(&req.command);
    cmd.args(&req.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &req.cwd {
        cmd.current_dir(dir);
    }
    let out = cmd.output().await?;
    Ok(ExecOutput {
        code: out.status.code(),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    })
}

/// Report a spawn failure to the log and to script.
fn fail(replier: &Replier, action: &str, e: &dyn StdError) {
    warn!(action, "shell action failed: {}", e);
    replier.error(format!("{action}: {e}"));
}

/// Handles `type: "shell"`.
pub struct ShellHandler {
    /// Where processes are awaited.
    runtime: Handle,
}

impl ShellHandler {
    /// Handler running processes on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Handler for ShellHandler {
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        let replier = cx.replier.clone();
        let reply_action = action.to_string();
        match action {
            "open" => {
                let OpenData { target } = parse_data(action, data)?;
                if target.trim().is_empty() {
                    return Err(Error::invalid_data(action, "target must not be empty"));
                }
                debug!(%target, "opening");
                self.runtime.spawn(async move {
                    match Command::new(OPENER).arg(&target).status().await {
                        Ok(status) if status.success() => replier.result(&reply_action, true),
                        Ok(status) => replier.error(format!("{reply_action}: {OPENER} exited with {status}")),
                        Err(e) => fail(&replier, &reply_action, &e),
                    }
                });
            }
            "exec" => {
                let req: ExecData = parse_data(action, data)?;
                if req.command.trim().is_empty() {
                    return Err(Error::invalid_data(action, "command must not be empty"));
                }
                debug!(?req, "exec");
                self.runtime.spawn(async move {
                    match exec(req).await {
                        Ok(out) => replier.result(&reply_action, out),
                        Err(e) => fail(&replier, &reply_action, &e),
                    }
                });
            }
            _ => return Err(Error::unknown_action("shell", action)),
        }
        Ok(())
    }

    fn replies_to(&self, _action: &str) -> bool {
        true
    }
}
