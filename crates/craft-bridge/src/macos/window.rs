//! Focusable window subclasses.
//!
//! Borderless and utility windows refuse key and main status by default,
//! which keeps web content from receiving keyboard input. Each window class
//! gets a derived class answering YES to both, and the window is moved onto
//! it in place.

use std::{ffi::CString, mem::transmute, ptr};

use objc2::runtime::{AnyObject, Bool, Sel};
use tracing::{debug, warn};

use super::{Platform, runtime::ObjcRuntime};
use crate::{
    error::{Error, Result},
    types::{Imp, MethodSpec},
};

/// Name prefix of the derived window classes.
pub const FOCUSABLE_PREFIX: &str = "CraftFocusable";

/// `canBecomeKeyWindow` / `canBecomeMainWindow`
type PredicateFn = unsafe extern "C" fn(*mut AnyObject, Sel) -> Bool;

unsafe extern "C" fn always_yes(_this: *mut AnyObject, _cmd: Sel) -> Bool {
    Bool::YES
}

/// Make `window` able to become key and main.
///
/// Returns `Ok(false)` when the derived class could not be built; the window
/// keeps its original class and focus behavior in that case.
///
/// # Safety
/// `window` must be an `NSWindow` (or subclass) instance; call on the main
/// thread.
pub unsafe fn make_focusable(platform: &Platform, window: &AnyObject) -> Result<bool> {
    let current = window.class();
    let base_name = current.name().to_string_lossy();
    if base_name.starts_with(FOCUSABLE_PREFIX) {
        return Ok(true);
    }
    let name = CString::new(format!("{FOCUSABLE_PREFIX}{base_name}")).map_err(|e| {
        Error::Registration {
            name: base_name.to_string(),
            reason: e.to_string(),
        }
    })?;
    // SAFETY: the signature strings match `PredicateFn`.
    let imp = unsafe { transmute::<PredicateFn, Imp>(always_yes) };
    let methods = [
        MethodSpec::new(c"canBecomeKeyWindow", imp, c"B@:"),
        MethodSpec::new(c"canBecomeMainWindow", imp, c"B@:"),
    ];
    let cls = platform.types().get_or_create(&name, current, &methods);
    if ptr::eq(cls, current) {
        warn!(class = %base_name, "window stays non-focusable");
        return Ok(false);
    }
    // SAFETY: `cls` derives from the window's class and adds no ivars.
    unsafe { ObjcRuntime::set_class(window, cls) };
    debug!(class = ?name, "window made focusable");
    Ok(true)
}
