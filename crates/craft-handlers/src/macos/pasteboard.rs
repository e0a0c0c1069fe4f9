//! Plain-text pasteboard access.

use craft_bridge::{ClipboardOp, Replier};
use objc2_app_kit::{NSPasteboard, NSPasteboardTypeString};
use objc2_foundation::NSString;
use tracing::{debug, warn};

/// Apply `op` to the general pasteboard.
pub(super) fn apply(op: ClipboardOp, replier: &Replier) {
    // SAFETY: general pasteboard access with the plain-text type constant.
    unsafe {
        let pb = NSPasteboard::generalPasteboard();
        match op {
            ClipboardOp::WriteText { text } => {
                pb.clearContents();
                if !pb.setString_forType(&NSString::from_str(&text), NSPasteboardTypeString) {
                    warn!("pasteboard rejected text");
                }
            }
            ClipboardOp::ReadText { reply_action } => {
                let text = pb
                    .stringForType(NSPasteboardTypeString)
                    .map(|s| s.to_string());
                debug!(found = text.is_some(), "pasteboard read");
                replier.result(&reply_action, text);
            }
            ClipboardOp::Clear => {
                pb.clearContents();
            }
        }
    }
}
