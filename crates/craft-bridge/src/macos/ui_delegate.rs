//! Web view UI delegate answering media capture permission requests.

use std::{ffi::{CStr, c_void}, mem::transmute, ptr};

use objc2::{
    msg_send,
    rc::Retained,
    runtime::{AnyObject, Sel},
};
use tracing::{debug, error};

use super::{Platform, runtime::ObjcRuntime, with_platform};
use crate::{
    decision::{Decision, DecisionHandle, DecisionInvoker},
    error::{Error, Result},
    types::{Imp, MethodSpec},
};

/// Runtime name of the UI delegate class.
pub const UI_DELEGATE_CLASS: &CStr = c"CraftUIDelegate";

/// `webView:requestMediaCapturePermissionForOrigin:initiatedByFrame:type:decisionHandler:`
type MediaRequestFn = unsafe extern "C" fn(
    *mut AnyObject,
    Sel,
    *mut AnyObject,
    *mut AnyObject,
    *mut AnyObject,
    isize,
    *mut c_void,
);

/// `WKPermissionDecision` value for `decision`. WebKit numbers its cases
/// prompt=0, grant=1, deny=2.
fn webkit_code(decision: Decision) -> i64 {
    match decision {
        Decision::Prompt => 0,
        Decision::Grant => 1,
        Decision::Deny => 2,
    }
}

unsafe extern "C" fn request_media(
    _this: *mut AnyObject,
    _cmd: Sel,
    _webview: *mut AnyObject,
    _origin: *mut AnyObject,
    _frame: *mut AnyObject,
    kind: isize,
    handler: *mut c_void,
) {
    // Without a platform nothing grants access.
    let decision = with_platform(|p| p.bridge().media_decision(kind as i64)).unwrap_or(Decision::Deny);
    debug!(kind, ?decision, "media capture request");
    // SAFETY: WebKit passes its decision block as the last argument.
    let handle = unsafe { DecisionHandle::from_raw(handler) };
    if let Err(e) = DecisionInvoker::invoke_code(handle, webkit_code(decision)) {
        error!("media capture decision not delivered: {}", e);
    }
}

/// Install a UI delegate on `webview` that answers media capture requests
/// from the configured permission policy.
///
/// The web view does not retain its UI delegate; keep the returned object
/// alive for as long as the web view.
///
/// # Safety
/// `webview` must be a `WKWebView`; call on the main thread.
pub unsafe fn attach_ui_delegate(
    platform: &Platform,
    webview: &AnyObject,
) -> Result<Retained<AnyObject>> {
    let base = ObjcRuntime::class(c"NSObject").ok_or_else(|| Error::Registration {
        name: UI_DELEGATE_CLASS.to_string_lossy().into_owned(),
        reason: "NSObject not found".into(),
    })?;
    // SAFETY: the signature string matches `MediaRequestFn`.
    let imp = unsafe { transmute::<MediaRequestFn, Imp>(request_media) };
    let methods = [MethodSpec::new(
        c"webView:requestMediaCapturePermissionForOrigin:initiatedByFrame:type:decisionHandler:",
        imp,
        c"v@:@@@q@?",
    )];
    let cls = platform.types().get_or_create(UI_DELEGATE_CLASS, base, &methods);
    if ptr::eq(cls, base) {
        return Err(Error::Registration {
            name: UI_DELEGATE_CLASS.to_string_lossy().into_owned(),
            reason: "UI delegate class unavailable".into(),
        });
    }
    let _ = ObjcRuntime::adopt_protocol(cls, c"WKUIDelegate");
    // SAFETY: `cls` is a plain NSObject subclass; the caller guarantees a
    // WKWebView.
    unsafe {
        let delegate: Retained<AnyObject> = msg_send![cls, new];
        let _: () = msg_send![webview, setUIDelegate: &*delegate];
        debug!("media permission delegate attached");
        Ok(delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_map_to_webkit_codes() {
        assert_eq!(webkit_code(Decision::Prompt), 0);
        assert_eq!(webkit_code(Decision::Grant), 1);
        assert_eq!(webkit_code(Decision::Deny), 2);
    }
}
