//! `clipboard` handler.

use craft_bridge::{ClipboardOp, Context, Error, Handler, MainOp, Result, parse_data};
use serde::Deserialize;

/// `writeText` payload.
#[derive(Deserialize)]
struct WriteData {
    /// Text to place on the pasteboard.
    text: String,
}

/// Handles `type: "clipboard"`.
pub struct ClipboardHandler;

impl Handler for ClipboardHandler {
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        let op = match action {
            "writeText" => {
                let WriteData { text } = parse_data(action, data)?;
                ClipboardOp::WriteText { text }
            }
            "readText" => ClipboardOp::ReadText {
                reply_action: action.to_string(),
            },
            "clear" => ClipboardOp::Clear,
            _ => return Err(Error::unknown_action("clipboard", action)),
        };
        cx.main_ops.push(MainOp::Clipboard { op });
        Ok(())
    }

    fn replies_to(&self, action: &str) -> bool {
        action == "readText"
    }
}
