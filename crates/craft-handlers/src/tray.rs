//! `tray` handler and the click queue polled by script.
//!
//! Menu clicks arrive on the tray library's event thread, which cannot
//! evaluate script. They are parked in [`TrayActions`] until script calls
//! `tray/pollActions`.

use std::{collections::VecDeque, sync::Arc};

use craft_bridge::{Context, Error, Handler, MainOp, Result, TrayMenuItem, TrayOp, parse_data};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{trace, warn};

/// Most clicks kept between polls; older ones are dropped first.
pub const MAX_PENDING_ACTIONS: usize = 256;

/// Clicked tray menu item ids, oldest first.
#[derive(Clone, Default)]
pub struct TrayActions {
    /// Pending ids.
    pending: Arc<Mutex<VecDeque<String>>>,
}

impl TrayActions {
    /// Record a click on menu item `id`.
    pub fn push(&self, id: impl Into<String>) {
        let id = id.into();
        trace!(%id, "tray action queued");
        let mut pending = self.pending.lock();
        if pending.len() >= MAX_PENDING_ACTIONS
            && let Some(dropped) = pending.pop_front()
        {
            warn!(%dropped, "tray actions not polled, dropping oldest");
        }
        pending.push_back(id);
    }

    /// Take all pending ids.
    pub fn drain(&self) -> Vec<String> {
        self.pending.lock().drain(..).collect()
    }
}

/// `setTitle` payload.
#[derive(Deserialize)]
struct TitleData {
    /// New title.
    title: String,
}

/// `setTooltip` payload.
#[derive(Deserialize)]
struct TooltipData {
    /// New tooltip.
    tooltip: String,
}

/// One menu entry as sent by script.
#[derive(Deserialize)]
struct MenuItemData {
    /// Identifier reported on click.
    id: String,
    /// Display text.
    label: String,
    /// Defaults to enabled.
    #[serde(default = "enabled_default")]
    enabled: bool,
}

/// Serde default for [`MenuItemData::enabled`].
fn enabled_default() -> bool {
    true
}

/// `setMenu` payload.
#[derive(Deserialize)]
struct MenuData {
    /// Entries in order.
    items: Vec<MenuItemData>,
}

/// Handles `type: "tray"`.
pub struct TrayHandler {
    /// Clicks waiting for a poll.
    actions: TrayActions,
}

impl TrayHandler {
    /// Handler draining `actions` on poll.
    pub fn new(actions: TrayActions) -> Self {
        Self { actions }
    }
}

impl Handler for TrayHandler {
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        let op = match action {
            "pollActions" => {
                cx.replier.result(action, self.actions.drain());
                return Ok(());
            }
            "setTitle" => {
                let TitleData { title } = parse_data(action, data)?;
                TrayOp::SetTitle { title }
            }
            "setTooltip" => {
                let TooltipData { tooltip } = parse_data(action, data)?;
                TrayOp::SetTooltip { tooltip }
            }
            "setMenu" => {
                let MenuData { items } = parse_data(action, data)?;
                if let Some(dup) = items
                    .iter()
                    .enumerate()
                    .find(|(i, a)| items[..*i].iter().any(|b| b.id == a.id))
                {
                    return Err(Error::invalid_data(
                        action,
                        format!("duplicate menu item id {:?}", dup.1.id),
                    ));
                }
                TrayOp::SetMenu {
                    items: items
                        .into_iter()
                        .map(|i| TrayMenuItem {
                            id: i.id,
                            label: i.label,
                            enabled: i.enabled,
                        })
                        .collect(),
                }
            }
            _ => return Err(Error::unknown_action("tray", action)),
        };
        cx.main_ops.push(MainOp::Tray { op });
        Ok(())
    }

    fn replies_to(&self, action: &str) -> bool {
        action == "pollActions"
    }
}
