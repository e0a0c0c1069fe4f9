//! `dialog` handler.
//!
//! Dialogs are modal and must run on the UI thread, so the handler only
//! validates and queues the request. The executor replies under the same
//! action name once the user dismisses the dialog.

use craft_bridge::{Context, DialogKind, DialogRequest, Error, Handler, MainOp, Result};
use serde::Deserialize;

/// Payload shared by all dialog actions; every field is optional.
#[derive(Deserialize, Default)]
#[serde(default)]
struct DialogData {
    /// Window or panel title.
    title: String,
    /// Informative text.
    message: String,
}

/// Handles `type: "dialog"`.
pub struct DialogHandler;

impl Handler for DialogHandler {
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        let kind = match action {
            "alert" => DialogKind::Alert,
            "confirm" => DialogKind::Confirm,
            "openFile" => DialogKind::OpenFile,
            "saveFile" => DialogKind::SaveFile,
            _ => return Err(Error::unknown_action("dialog", action)),
        };
        let DialogData { title, message } = match data {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| Error::invalid_data(action, e.to_string()))?,
            None => DialogData::default(),
        };
        cx.main_ops.push(MainOp::Dialog(DialogRequest {
            kind,
            title,
            message,
            reply_action: action.to_string(),
        }));
        Ok(())
    }

    fn replies_to(&self, action: &str) -> bool {
        matches!(action, "confirm" | "openFile" | "saveFile")
    }
}
