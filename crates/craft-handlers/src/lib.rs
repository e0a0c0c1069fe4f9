//! Default capability handlers for the Craft bridge.
//!
//! Each handler owns one message `type`:
//!
//! | type           | actions                                                        |
//! |----------------|----------------------------------------------------------------|
//! | `app`          | `getInfo`, `quit`, `hide`, `show`, `ping`                      |
//! | `window`       | `show`, `hide`, `close`, `minimize`, `center`, `toggleFullscreen`, `setTitle`, `setSize` |
//! | `tray`         | `setTitle`, `setTooltip`, `setMenu`, `pollActions`             |
//! | `notification` | `show`                                                         |
//! | `dialog`       | `alert`, `confirm`, `openFile`, `saveFile`                     |
//! | `clipboard`    | `writeText`, `readText`, `clear`                               |
//! | `fs`           | `readFile`, `writeFile`, `exists`, `readDir`, `mkdir`, `remove` |
//! | `shell`        | `open`, `exec`                                                 |
//!
//! Handlers never touch the toolkit directly. UI work is queued as
//! [`MainOp`](craft_bridge::MainOp)s for the platform executor
//! ([`macos::executor`] on macOS); disk and process work runs on the tokio
//! runtime in [`HandlerDeps`] and replies asynchronously.
#![warn(missing_docs)]

mod app;
mod clipboard;
mod dialog;
mod fs;
mod notification;
mod shell;
mod tray;
mod window;

#[cfg(target_os = "macos")]
pub mod macos;

use craft_bridge::{BridgeConfig, HandlerRegistry};
use tokio::runtime::Handle;

pub use app::{AppHandler, AppInfo};
pub use clipboard::ClipboardHandler;
pub use dialog::DialogHandler;
pub use fs::FsHandler;
pub use notification::NotificationHandler;
pub use shell::{ExecOutput, ShellHandler};
pub use tray::{MAX_PENDING_ACTIONS, TrayActions, TrayHandler};
pub use window::WindowHandler;

/// Shared dependencies handed to every handler factory.
#[derive(Clone)]
pub struct HandlerDeps {
    /// Runtime for disk and process work.
    pub runtime: Handle,
    /// Tray menu clicks waiting for `tray/pollActions`.
    pub tray_actions: TrayActions,
    /// Name reported by `app/getInfo`.
    pub app_name: String,
    /// Version reported by `app/getInfo`.
    pub app_version: String,
}

impl HandlerDeps {
    /// Dependencies using `runtime` and the app identity from `config`.
    pub fn new(runtime: Handle, config: &BridgeConfig) -> Self {
        Self {
            runtime,
            tray_actions: TrayActions::default(),
            app_name: config.app_name.clone(),
            app_version: config.app_version.clone(),
        }
    }
}

/// Register every default handler on `registry`.
pub fn register_defaults(registry: &mut HandlerRegistry, deps: &HandlerDeps) {
    let d = deps.clone();
    registry.register("app", move || Box::new(AppHandler::new(&d)));
    registry.register("window", || Box::new(WindowHandler));
    let d = deps.clone();
    registry.register("tray", move || Box::new(TrayHandler::new(d.tray_actions.clone())));
    registry.register("notification", || Box::new(NotificationHandler));
    registry.register("dialog", || Box::new(DialogHandler));
    registry.register("clipboard", || Box::new(ClipboardHandler));
    let d = deps.clone();
    registry.register("fs", move || Box::new(FsHandler::new(d.runtime.clone())));
    let d = deps.clone();
    registry.register("shell", move || Box::new(ShellHandler::new(d.runtime.clone())));
}

/// Registry holding every default handler.
pub fn default_registry(deps: &HandlerDeps) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    register_defaults(&mut registry, deps);
    registry
}
