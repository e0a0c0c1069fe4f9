//! `notification` handler.

use craft_bridge::{Context, Error, Handler, MainOp, Notification, Result, parse_data};
use serde::Deserialize;

/// `show` payload.
#[derive(Deserialize)]
struct ShowData {
    /// Headline.
    title: String,
    /// Body text; empty when absent.
    #[serde(default)]
    body: String,
}

/// Handles `type: "notification"`.
pub struct NotificationHandler;

impl Handler for NotificationHandler {
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        if action != "show" {
            return Err(Error::unknown_action("notification", action));
        }
        let ShowData { title, body } = parse_data(action, data)?;
        if title.trim().is_empty() {
            return Err(Error::invalid_data(action, "title must not be empty"));
        }
        cx.main_ops.push(MainOp::Notify(Notification { title, body }));
        Ok(())
    }
}
