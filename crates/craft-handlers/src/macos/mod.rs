//! AppKit executor for queued [`MainOp`]s and one-call bridge setup.
//!
//! The bridge platform calls the executor on the main thread whenever it
//! flushes. Each op is applied immediately; ops that script waits on reply
//! through the [`Replier`] handed in with the op.

mod app;
mod dialog;
mod notify;
mod pasteboard;
mod setup;
mod status_item;
mod window;

use std::cell::RefCell;

use craft_bridge::{MainOp, Replier, macos::Executor};
use objc2_foundation::MainThreadMarker;
use tracing::{trace, warn};

pub use setup::{Attached, MESSAGE_HANDLER, Views, attach};
use status_item::StatusItem;

use crate::tray::TrayActions;

/// Build the executor. Tray menu clicks are recorded into `tray_actions`.
pub fn executor(tray_actions: TrayActions) -> Executor {
    let status = RefCell::new(StatusItem::new(tray_actions));
    Box::new(move |op: MainOp, replier: &Replier| {
        let Some(mtm) = MainThreadMarker::new() else {
            warn!(?op, "main op executed off the main thread, dropping");
            return;
        };
        trace!(?op, "executing main op");
        match op {
            MainOp::Window { op } => window::apply(&op, mtm),
            MainOp::App { op } => app::apply(op, mtm),
            MainOp::Tray { op } => status.borrow_mut().apply(op),
            MainOp::Notify(n) => notify::post(&n),
            MainOp::Dialog(req) => dialog::run(&req, replier),
            MainOp::Clipboard { op } => pasteboard::apply(op, replier),
        }
    })
}
