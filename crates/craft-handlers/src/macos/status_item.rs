//! Status bar item backed by `tray-icon`.
//!
//! The icon is created on the first tray op. Menu clicks are read on a
//! listener thread and recorded into [`TrayActions`] for script to poll.

use std::thread;

use craft_bridge::{TrayMenuItem, TrayOp};
use tracing::{debug, error};
use tray_icon::{
    TrayIcon, TrayIconBuilder,
    menu::{Menu, MenuEvent, MenuItem},
};

use crate::tray::TrayActions;

/// Lazily created status item plus its click sink.
pub(super) struct StatusItem {
    /// The live icon, once created.
    icon: Option<TrayIcon>,
    /// Where clicks go.
    actions: TrayActions,
    /// Whether the menu listener thread is running.
    listening: bool,
}

impl StatusItem {
    /// No icon yet.
    pub(super) fn new(actions: TrayActions) -> Self {
        Self {
            icon: None,
            actions,
            listening: false,
        }
    }

    /// The icon, creating it on first use.
    fn icon(&mut self) -> Option<&TrayIcon> {
        if self.icon.is_none() {
            match TrayIconBuilder::new().with_title("").build() {
                Ok(icon) => {
                    debug!("status item created");
                    self.icon = Some(icon);
                }
                Err(e) => {
                    error!("Failed to create tray icon: {}", e);
                    return None;
                }
            }
        }
        self.icon.as_ref()
    }

    /// Start forwarding menu clicks, once.
    fn listen(&mut self) {
        if self.listening {
            return;
        }
        self.listening = true;
        let actions = self.actions.clone();
        thread::spawn(move || {
            let menu_rx = MenuEvent::receiver();
            while let Ok(ev) = menu_rx.recv() {
                actions.push(ev.id.0);
            }
        });
    }

    /// Apply `op`.
    pub(super) fn apply(&mut self, op: TrayOp) {
        let listen = matches!(op, TrayOp::SetMenu { .. });
        let Some(icon) = self.icon() else { return };
        match op {
            TrayOp::SetTitle { title } => icon.set_title(Some(title)),
            TrayOp::SetTooltip { tooltip } => {
                if let Err(e) = icon.set_tooltip(Some(tooltip)) {
                    error!("tray tooltip not set: {}", e);
                }
            }
            TrayOp::SetMenu { items } => icon.set_menu(Some(Box::new(build_menu(&items)))),
        }
        if listen {
            self.listen();
        }
    }
}

/// Menu with one entry per item, ids preserved.
fn build_menu(items: &[TrayMenuItem]) -> Menu {
    let menu = Menu::new();
    for item in items {
        let entry = MenuItem::with_id(item.id.as_str(), &item.label, item.enabled, None);
        if let Err(e) = menu.append(&entry) {
            error!(id = %item.id, "tray menu entry not added: {}", e);
        }
    }
    menu
}
