//! Invoking OS-supplied decision callbacks.
//!
//! Permission prompts (media capture, for example) hand the delegate a
//! closure that must be called with a decision code. Its static type is not
//! expressible here, so we overlay the documented block layout on the raw
//! pointer and call the invoke slot directly. This module is the only place
//! that layout assumption lives.
//!
//! Assumed layout (Apple block ABI, `Block_layout` in `Block_private.h`),
//! verified for arm64 and x86_64 on macOS 11 through 15:
//!
//! ```text
//! offset 0            isa       *const c_void
//! offset ptr          flags     i32
//! offset ptr + 4      reserved  i32
//! offset ptr + 8      invoke    unsafe extern "C" fn(*mut c_void, i64)
//! ```
//!
//! A handle that does not have this layout is undefined behavior, not an
//! error: callers must only pass handles received from the toolkit's
//! decision-handler parameters.

use std::ffi::c_void;

use tracing::debug;

use crate::error::{Error, Result};

/// Decision code passed to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum Decision {
    /// Refuse the request.
    Deny = 0,
    /// Allow the request.
    Grant = 1,
    /// Let the system ask the user.
    Prompt = 2,
}

/// Signature of the block's invoke slot.
pub type InvokeFn = unsafe extern "C" fn(*mut c_void, i64);

/// Memory overlay for a decision block.
#[repr(C)]
pub struct BlockLayout {
    /// Class pointer of the block object.
    pub isa: *const c_void,
    /// Block flags.
    pub flags: i32,
    /// Reserved by the ABI.
    pub reserved: i32,
    /// Function called with `(block, decision)`.
    pub invoke: InvokeFn,
}

/// Raw, opaque pointer to an OS decision closure.
#[derive(Debug, Clone, Copy)]
pub struct DecisionHandle(*mut c_void);

impl DecisionHandle {
    /// Wrap a raw pointer received from the toolkit.
    ///
    /// # Safety
    /// `ptr` must be null or point to a live block with the layout documented
    /// on this module for as long as the handle is used.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    /// The wrapped pointer.
    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }
}

/// Calls decision callbacks through the block layout overlay.
pub struct DecisionInvoker;

impl DecisionInvoker {
    /// Answer `handle` with `decision`.
    ///
    /// Only a null handle is detected; any other layout mismatch is undefined
    /// behavior.
    pub fn invoke(handle: DecisionHandle, decision: Decision) -> Result<()> {
        debug!(?decision, "invoking decision callback");
        Self::invoke_code(handle, decision as i64)
    }

    /// Answer `handle` with a raw code, for callbacks whose decision enum
    /// numbers its cases differently from [`Decision`].
    ///
    /// Same checks as [`Self::invoke`].
    pub fn invoke_code(handle: DecisionHandle, code: i64) -> Result<()> {
        let ptr = handle.as_ptr();
        if ptr.is_null() {
            return Err(Error::Layout("null decision handle"));
        }
        // SAFETY: `DecisionHandle::from_raw` requires a live block with
        // `BlockLayout` at `ptr`; the invoke slot takes the block itself as
        // its first argument.
        unsafe {
            let layout = &*(ptr as *const BlockLayout);
            (layout.invoke)(ptr, code);
        }
        Ok(())
    }

    /// Answer with [`Decision::Grant`].
    pub fn grant(handle: DecisionHandle) -> Result<()> {
        Self::invoke(handle, Decision::Grant)
    }

    /// Answer with [`Decision::Deny`].
    pub fn deny(handle: DecisionHandle) -> Result<()> {
        Self::invoke(handle, Decision::Deny)
    }

    /// Answer with [`Decision::Prompt`].
    pub fn prompt(handle: DecisionHandle) -> Result<()> {
        Self::invoke(handle, Decision::Prompt)
    }
}
