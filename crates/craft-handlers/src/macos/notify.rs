//! User notifications through `NSUserNotificationCenter`.

use craft_bridge::Notification;
use objc2::{
    msg_send,
    rc::Retained,
    runtime::{AnyClass, AnyObject},
};
use objc2_foundation::NSString;
use tracing::{debug, warn};

/// Post `n`. Logs and returns if the notification center is unavailable.
pub(super) fn post(n: &Notification) {
    let (Some(center_cls), Some(note_cls)) = (
        AnyClass::get(c"NSUserNotificationCenter"),
        AnyClass::get(c"NSUserNotification"),
    ) else {
        warn!("notification center unavailable");
        return;
    };
    let title = NSString::from_str(&n.title);
    let body = NSString::from_str(&n.body);
    // SAFETY: documented class methods and setters of the notification API.
    unsafe {
        let center: Option<Retained<AnyObject>> = msg_send![center_cls, defaultUserNotificationCenter];
        let Some(center) = center else {
            warn!("no default notification center");
            return;
        };
        let note: Retained<AnyObject> = msg_send![note_cls, new];
        let _: () = msg_send![&*note, setTitle: &*title];
        let _: () = msg_send![&*note, setInformativeText: &*body];
        let _: () = msg_send![&*center, deliverNotification: &*note];
    }
    debug!(title = %n.title, "notification posted");
}
