//! `fs` handler.
//!
//! Every action runs on the tokio runtime and replies asynchronously under
//! its action name; failures are delivered to script as errors.

use std::{io, path::PathBuf};

use craft_bridge::{Context, Error, Handler, Replier, Result, parse_data};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::{fs, runtime::Handle};
use tracing::{debug, warn};

/// Payload carrying only a path.
#[derive(Deserialize)]
struct PathData {
    /// Target path.
    path: PathBuf,
}

/// `writeFile` payload.
#[derive(Deserialize)]
struct WriteData {
    /// Target path.
    path: PathBuf,
    /// UTF-8 contents.
    content: String,
}

/// `mkdir` / `remove` payload.
#[derive(Deserialize)]
struct TreeData {
    /// Target path.
    path: PathBuf,
    /// Create parents / remove contents.
    #[serde(default)]
    recursive: bool,
}

/// One `readDir` entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DirEntry {
    /// File name.
    name: String,
    /// True for directories.
    is_dir: bool,
}

/// A validated filesystem request.
#[derive(Debug)]
enum FsRequest {
    /// Read a file as UTF-8.
    Read(PathBuf),
    /// Replace a file's contents.
    Write(PathBuf, String),
    /// Whether a path exists.
    Exists(PathBuf),
    /// List a directory.
    ReadDir(PathBuf),
    /// Create a directory.
    Mkdir(PathBuf, bool),
    /// Remove a file or directory.
    Remove(PathBuf, bool),
}

/// Reject empty paths before anything touches the disk.
fn non_empty(action: &str, path: PathBuf) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid_data(action, "path must not be empty"));
    }
    Ok(path)
}

impl FsRequest {
    /// Decode `action` and its payload.
    fn parse(action: &str, data: Option<&str>) -> Result<Self> {
        let path = |d: PathData| non_empty(action, d.path);
        Ok(match action {
            "readFile" => Self::Read(path(parse_data(action, data)?)?),
            "exists" => Self::Exists(path(parse_data(action, data)?)?),
            "readDir" => Self::ReadDir(path(parse_data(action, data)?)?),
            "writeFile" => {
                let WriteData { path, content } = parse_data(action, data)?;
                Self::Write(non_empty(action, path)?, content)
            }
            "mkdir" => {
                let TreeData { path, recursive } = parse_data(action, data)?;
                Self::Mkdir(non_empty(action, path)?, recursive)
            }
            "remove" => {
                let TreeData { path, recursive } = parse_data(action, data)?;
                Self::Remove(non_empty(action, path)?, recursive)
            }
            _ => return Err(Error::unknown_action("fs", action)),
        })
    }

    /// Perform the request.
    async fn run(self) -> io::Result<Value> {
        match self {
            Self::Read(p) => Ok(Value::String(fs::read_to_string(&p).await?)),
            Self::Write(p, content) => {
                fs::write(&p, content).await?;
                Ok(Value::Bool(true))
            }
            Self::Exists(p) => Ok(Value::Bool(fs::try_exists(&p).await?)),
            Self::ReadDir(p) => {
                let mut entries = Vec::new();
                let mut dir = fs::read_dir(&p).await?;
                while let Some(entry) = dir.next_entry().await? {
                    entries.push(DirEntry {
                        name: entry.file_name().to_string_lossy().into_owned(),
                        is_dir: entry.file_type().await?.is_dir(),
                    });
                }
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(json!(entries))
            }
            Self::Mkdir(p, recursive) => {
                if recursive {
                    fs::create_dir_all(&p).await?;
                } else {
                    fs::create_dir(&p).await?;
                }
                Ok(Value::Bool(true))
            }
            Self::Remove(p, recursive) => {
                let meta = fs::symlink_metadata(&p).await?;
                if !meta.is_dir() {
                    fs::remove_file(&p).await?;
                } else if recursive {
                    fs::remove_dir_all(&p).await?;
                } else {
                    fs::remove_dir(&p).await?;
                }
                Ok(Value::Bool(true))
            }
        }
    }
}

/// Deliver the outcome of an fs action.
fn reply(replier: &Replier, action: &str, outcome: io::Result<Value>) {
    match outcome {
        Ok(v) => replier.result(action, v),
        Err(e) => {
            warn!(action, "fs action failed: {}", e);
            replier.error(format!("{action}: {e}"));
        }
    }
}

/// Handles `type: "fs"`.
pub struct FsHandler {
    /// Where requests run.
    runtime: Handle,
}

impl FsHandler {
    /// Handler running requests on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Handler for FsHandler {
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        let request = FsRequest::parse(action, data)?;
        debug!(?request, "fs request");
        let replier = cx.replier.clone();
        let action = action.to_string();
        self.runtime.spawn(async move {
            let outcome = request.run().await;
            reply(&replier, &action, outcome);
        });
        Ok(())
    }

    fn replies_to(&self, _action: &str) -> bool {
        true
    }
}
