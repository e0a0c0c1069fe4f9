//! Scheduling bridge flushes onto the main thread.
//!
//! Wakes from worker threads are coalesced: at most one flush is queued on
//! the main dispatch queue at a time.

use std::{
    ffi::c_void,
    ptr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use super::with_platform;
use crate::script::Waker;

/// Opaque `dispatch_queue_s`.
#[repr(C)]
struct DispatchQueue {
    /// Zero-sized; never constructed.
    _private: [u8; 0],
}

#[link(name = "System", kind = "dylib")]
unsafe extern "C" {
    static _dispatch_main_q: DispatchQueue;
    fn dispatch_async_f(
        queue: *const DispatchQueue,
        context: *mut c_void,
        work: unsafe extern "C" fn(*mut c_void),
    );
}

/// Set while a flush is queued and has not started.
static SCHEDULED: AtomicBool = AtomicBool::new(false);

unsafe extern "C" fn flush_on_main(_context: *mut c_void) {
    SCHEDULED.store(false, Ordering::Release);
    with_platform(|p| p.flush());
}

/// Waker that queues [`Platform::flush`](super::Platform::flush) on the main
/// dispatch queue.
pub fn main_thread_waker() -> Waker {
    Arc::new(|| {
        if SCHEDULED.swap(true, Ordering::AcqRel) {
            return;
        }
        // SAFETY: the main queue is a process-lifetime static and the work
        // function ignores its context.
        unsafe {
            dispatch_async_f(&raw const _dispatch_main_q, ptr::null_mut(), flush_on_main);
        }
    })
}
