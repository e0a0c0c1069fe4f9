//! Operations that must run on the UI thread.
//!
//! Capability handlers decode and validate a request, then enqueue a
//! [`MainOp`]. The platform layer drains the queue from its event loop and
//! performs the toolkit calls. Results that script is waiting on (dialog
//! choices, clipboard contents) are posted back through the reply path by
//! the executor, keyed by the op's `reply_action`.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::script::Waker;

/// Window-level operation on the bridge's main window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum WindowOp {
    /// Order the window front and make it key.
    Show,
    /// Order the window out.
    Hide,
    /// Close the window.
    Close,
    /// Miniaturize into the Dock.
    Minimize,
    /// Center on the current screen.
    Center,
    /// Enter or leave native fullscreen.
    ToggleFullscreen,
    /// Replace the title.
    SetTitle {
        /// New title.
        title: String,
    },
    /// Resize the content area, keeping the top-left corner.
    SetSize {
        /// Width in points.
        width: f64,
        /// Height in points.
        height: f64,
    },
}

/// Application-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AppOp {
    /// Terminate the process through the toolkit.
    Quit,
    /// Hide all windows of the app.
    Hide,
    /// Activate the app, bringing it to the front.
    Show,
}

/// One entry of a tray menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrayMenuItem {
    /// Identifier reported when the entry is clicked.
    pub id: String,
    /// Display text.
    pub label: String,
    /// Whether the entry can be clicked.
    pub enabled: bool,
}

/// Status bar (tray) operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum TrayOp {
    /// Replace the status item title.
    SetTitle {
        /// New title.
        title: String,
    },
    /// Replace the hover tooltip.
    SetTooltip {
        /// New tooltip.
        tooltip: String,
    },
    /// Replace the whole menu.
    SetMenu {
        /// Entries in display order.
        items: Vec<TrayMenuItem>,
    },
}

/// User notification to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
}

/// Kind of modal dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogKind {
    /// Informational alert with a single button.
    Alert,
    /// OK/Cancel confirmation; replies with a boolean.
    Confirm,
    /// File chooser; replies with the chosen path or null.
    OpenFile,
    /// Save panel; replies with the chosen path or null.
    SaveFile,
}

/// Modal dialog request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogRequest {
    /// Which dialog to run.
    pub kind: DialogKind,
    /// Window/panel title.
    pub title: String,
    /// Informative text.
    pub message: String,
    /// Action name the result is delivered under.
    pub reply_action: String,
}

/// Pasteboard operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ClipboardOp {
    /// Replace the pasteboard contents with plain text.
    WriteText {
        /// Text to write.
        text: String,
    },
    /// Read plain text and reply under `reply_action`.
    ReadText {
        /// Action name the result is delivered under.
        reply_action: String,
    },
    /// Clear the pasteboard.
    Clear,
}

/// Queue of operations that must run on the UI thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum MainOp {
    /// Main window operation.
    Window {
        /// Operation to apply.
        op: WindowOp,
    },
    /// Application operation.
    App {
        /// Operation to apply.
        op: AppOp,
    },
    /// Tray operation.
    Tray {
        /// Operation to apply.
        op: TrayOp,
    },
    /// Post a notification.
    Notify(Notification),
    /// Run a modal dialog.
    Dialog(DialogRequest),
    /// Pasteboard operation.
    Clipboard {
        /// Operation to apply.
        op: ClipboardOp,
    },
}

/// Shared FIFO of [`MainOp`]s with a wake hook.
#[derive(Clone, Default)]
pub struct MainOps {
    /// Pending operations.
    queue: Arc<Mutex<VecDeque<MainOp>>>,
    /// Hook called after every push.
    waker: Arc<Mutex<Option<Waker>>>,
}

impl MainOps {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `op` and wake the UI thread.
    pub fn push(&self, op: MainOp) {
        debug!(?op, "MainOps: enqueue");
        self.queue.lock().push_back(op);
        let waker = self.waker.lock().clone();
        if let Some(w) = waker {
            w();
        }
    }

    /// Take every pending operation in FIFO order.
    pub fn drain(&self) -> Vec<MainOp> {
        self.queue.lock().drain(..).collect()
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Install the hook called after every push.
    pub fn set_waker(&self, waker: Waker) {
        *self.waker.lock() = Some(waker);
    }
}
