//! Modal alerts and file panels.

use craft_bridge::{DialogKind, DialogRequest, Replier};
use objc2::{
    msg_send,
    rc::Retained,
    runtime::{AnyClass, AnyObject},
};
use objc2_foundation::NSString;
use serde_json::Value;
use tracing::{debug, warn};

/// `NSAlertFirstButtonReturn`.
const FIRST_BUTTON: isize = 1000;
/// `NSModalResponseOK`.
const MODAL_OK: isize = 1;

/// Run an alert; true when the first button was pressed.
fn alert(req: &DialogRequest, cls: &AnyClass) -> bool {
    let (headline, detail) = if req.title.is_empty() {
        (&req.message, "")
    } else {
        (&req.title, req.message.as_str())
    };
    let headline = NSString::from_str(headline);
    let detail = NSString::from_str(detail);
    let ok = NSString::from_str("OK");
    let cancel = NSString::from_str("Cancel");
    // SAFETY: NSAlert API on the main thread.
    unsafe {
        let alert: Retained<AnyObject> = msg_send![cls, new];
        let _: () = msg_send![&*alert, setMessageText: &*headline];
        let _: () = msg_send![&*alert, setInformativeText: &*detail];
        let _: Option<Retained<AnyObject>> = msg_send![&*alert, addButtonWithTitle: &*ok];
        if req.kind == DialogKind::Confirm {
            let _: Option<Retained<AnyObject>> = msg_send![&*alert, addButtonWithTitle: &*cancel];
        }
        let response: isize = msg_send![&*alert, runModal];
        response == FIRST_BUTTON
    }
}

/// Run an open or save panel; the chosen path, if any.
fn panel(req: &DialogRequest, cls: &AnyClass, open: bool) -> Option<String> {
    let title = NSString::from_str(&req.title);
    let message = NSString::from_str(&req.message);
    // SAFETY: NSOpenPanel/NSSavePanel API on the main thread.
    unsafe {
        let panel: Retained<AnyObject> = if open {
            msg_send![cls, openPanel]
        } else {
            msg_send![cls, savePanel]
        };
        if !req.title.is_empty() {
            let _: () = msg_send![&*panel, setTitle: &*title];
        }
        if !req.message.is_empty() {
            let _: () = msg_send![&*panel, setMessage: &*message];
        }
        let response: isize = msg_send![&*panel, runModal];
        if response != MODAL_OK {
            return None;
        }
        let url: Option<Retained<AnyObject>> = msg_send![&*panel, URL];
        let path: Option<Retained<NSString>> = msg_send![&*url?, path];
        path.map(|p| p.to_string())
    }
}

/// Run `req` and reply under its `reply_action` (alerts do not reply).
pub(super) fn run(req: &DialogRequest, replier: &Replier) {
    let class_name = match req.kind {
        DialogKind::Alert | DialogKind::Confirm => c"NSAlert",
        DialogKind::OpenFile => c"NSOpenPanel",
        DialogKind::SaveFile => c"NSSavePanel",
    };
    let Some(cls) = AnyClass::get(class_name) else {
        warn!(kind = ?req.kind, "dialog class unavailable");
        replier.error(format!("{}: dialog unavailable", req.reply_action));
        return;
    };
    let reply = match req.kind {
        DialogKind::Alert => {
            alert(req, cls);
            None
        }
        DialogKind::Confirm => Some(Value::Bool(alert(req, cls))),
        DialogKind::OpenFile => Some(panel(req, cls, true).map_or(Value::Null, Value::String)),
        DialogKind::SaveFile => Some(panel(req, cls, false).map_or(Value::Null, Value::String)),
    };
    debug!(kind = ?req.kind, ?reply, "dialog finished");
    if let Some(v) = reply {
        replier.result(&req.reply_action, v);
    }
}
