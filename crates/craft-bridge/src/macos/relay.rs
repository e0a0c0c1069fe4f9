//! Script message relay.
//!
//! A runtime class conforming to `WKScriptMessageHandler` that forwards each
//! message body to [`Bridge::route`](crate::Bridge::route). Bodies arrive as
//! toolkit objects: strings pass through, JSON-representable collections are
//! serialized, and anything else is reduced to its `description`, which is
//! what the legacy text decoder understands.

use std::{ffi::CStr, mem::transmute, ptr};

use objc2::{
    msg_send,
    rc::Retained,
    runtime::{AnyObject, Sel},
};
use objc2_foundation::{NSJSONSerialization, NSJSONWritingOptions, NSString};
use tracing::{debug, trace};

use super::{Platform, runtime::ObjcRuntime, with_platform};
use crate::{
    error::{Error, Result},
    types::{Imp, MethodSpec},
};

/// Runtime name of the relay class.
pub const RELAY_CLASS: &CStr = c"CraftBridgeRelay";

/// `userContentController:didReceiveScriptMessage:`
type ReceiveFn = unsafe extern "C" fn(*mut AnyObject, Sel, *mut AnyObject, *mut AnyObject);

unsafe extern "C" fn did_receive(
    _this: *mut AnyObject,
    _cmd: Sel,
    _controller: *mut AnyObject,
    message: *mut AnyObject,
) {
    // SAFETY: WebKit passes a live WKScriptMessage.
    let Some(message) = (unsafe { message.as_ref() }) else {
        return;
    };
    // SAFETY: `body` is a WKScriptMessage property returning an object or nil.
    let body: Option<Retained<AnyObject>> = unsafe { msg_send![message, body] };
    let raw = body.as_deref().map(body_text).unwrap_or_default();
    trace!(len = raw.len(), "script message");
    if with_platform(|p| p.bridge().route(&raw)).is_none() {
        debug!("script message after teardown ignored");
    }
}

/// Text form of a message body.
fn body_text(body: &AnyObject) -> String {
    if let Some(s) = body.downcast_ref::<NSString>() {
        return s.to_string();
    }
    // SAFETY: both are class methods taking any object.
    unsafe {
        if NSJSONSerialization::isValidJSONObject(body)
            && let Ok(data) =
                NSJSONSerialization::dataWithJSONObject_options_error(body, NSJSONWritingOptions::empty())
            && let Ok(text) = String::from_utf8(data.to_vec())
        {
            return text;
        }
        let description: Retained<NSString> = msg_send![body, description];
        description.to_string()
    }
}

/// Register the relay under `name` on the web view's user content
/// controller, so script can post with
/// `window.webkit.messageHandlers.<name>.postMessage(...)`.
///
/// # Safety
/// `webview` must be a `WKWebView`; call on the main thread.
pub unsafe fn attach_relay(
    platform: &Platform,
    webview: &AnyObject,
    name: &str,
) -> Result<Retained<AnyObject>> {
    let base = ObjcRuntime::class(c"NSObject").ok_or_else(|| Error::Registration {
        name: RELAY_CLASS.to_string_lossy().into_owned(),
        reason: "NSObject not found".into(),
    })?;
    // SAFETY: the signature string matches `ReceiveFn`.
    let imp = unsafe { transmute::<ReceiveFn, Imp>(did_receive) };
    let methods = [MethodSpec::new(
        c"userContentController:didReceiveScriptMessage:",
        imp,
        c"v@:@@",
    )];
    let cls = platform.types().get_or_create(RELAY_CLASS, base, &methods);
    if ptr::eq(cls, base) {
        return Err(Error::Registration {
            name: RELAY_CLASS.to_string_lossy().into_owned(),
            reason: "relay class unavailable".into(),
        });
    }
    if !ObjcRuntime::adopt_protocol(cls, c"WKScriptMessageHandler") {
        trace!("WKScriptMessageHandler already adopted or not loaded");
    }
    let ns_name = NSString::from_str(name);
    // SAFETY: `cls` is a plain NSObject subclass; the caller guarantees a
    // WKWebView, whose configuration owns a WKUserContentController.
    unsafe {
        let relay: Retained<AnyObject> = msg_send![cls, new];
        let config: Retained<AnyObject> = msg_send![webview, configuration];
        let controller: Retained<AnyObject> = msg_send![&*config, userContentController];
        let _: () = msg_send![&*controller, addScriptMessageHandler: &*relay, name: &*ns_name];
        debug!(name, "script message relay attached");
        Ok(relay)
    }
}
