//! Application ops.

use craft_bridge::AppOp;
use objc2::msg_send;
use objc2_app_kit::NSApplication;
use objc2_foundation::MainThreadMarker;
use tracing::debug;

/// Apply `op` to the shared application.
pub(super) fn apply(op: AppOp, mtm: MainThreadMarker) {
    let app = NSApplication::sharedApplication(mtm);
    debug!(?op, "app op");
    // SAFETY: NSApplication messages on the main thread.
    unsafe {
        match op {
            AppOp::Quit => app.terminate(None),
            AppOp::Hide => app.hide(None),
            AppOp::Show => {
                app.unhide(None);
                let _: () = msg_send![&*app, activateIgnoringOtherApps: true];
            }
        }
    }
}
