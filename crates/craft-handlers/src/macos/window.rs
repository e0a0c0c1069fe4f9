//! Window ops against the app's key (or main) window.

use craft_bridge::WindowOp;
use objc2::rc::Retained;
use objc2_app_kit::{NSApplication, NSWindow};
use objc2_foundation::{MainThreadMarker, NSPoint, NSSize, NSString};
use tracing::{debug, warn};

/// Window the ops apply to: key, then main, then the first window.
fn target(mtm: MainThreadMarker) -> Option<Retained<NSWindow>> {
    let app = NSApplication::sharedApplication(mtm);
    app.keyWindow()
        .or_else(|| app.mainWindow())
        .or_else(|| app.windows().firstObject())
}

/// Apply `op`.
pub(super) fn apply(op: &WindowOp, mtm: MainThreadMarker) {
    let Some(window) = target(mtm) else {
        warn!(?op, "no window to apply op to");
        return;
    };
    debug!(?op, "window op");
    // SAFETY: AppKit calls on the main thread against a live window.
    unsafe {
        match op {
            WindowOp::Show => window.makeKeyAndOrderFront(None),
            WindowOp::Hide => window.orderOut(None),
            WindowOp::Close => window.close(),
            WindowOp::Minimize => window.miniaturize(None),
            WindowOp::Center => window.center(),
            WindowOp::ToggleFullscreen => window.toggleFullScreen(None),
            WindowOp::SetTitle { title } => window.setTitle(&NSString::from_str(title)),
            WindowOp::SetSize { width, height } => {
                let before = window.frame();
                let top = before.origin.y + before.size.height;
                window.setContentSize(NSSize::new(*width, *height));
                let after = window.frame();
                window.setFrameOrigin(NSPoint::new(after.origin.x, top - after.size.height));
            }
        }
    }
}
