//! AppKit and WebKit glue over a [`Bridge`].
//!
//! Toolkit callbacks arrive as plain `extern "C"` functions on classes built
//! at runtime, so they cannot capture state. The [`Platform`] installed on the
//! main thread owns the bridge and everything those callbacks need; each
//! callback looks it up with [`Platform::current`] and does nothing once it
//! has been torn down.

mod outline;
mod relay;
mod runtime;
mod ui_delegate;
mod wake;
mod webview;
mod window;

use std::{
    cell::{RefCell, RefMut},
    collections::HashMap,
    rc::Rc,
};

use objc2::rc::Retained;
use objc2_foundation::{MainThreadMarker, NSNumber};
use tracing::{debug, trace, warn};

pub use outline::{SIDEBAR_DATA_SOURCE, attach_sidebar, reload_sidebar};
pub use relay::{RELAY_CLASS, attach_relay};
pub use runtime::ObjcRuntime;
pub use ui_delegate::{UI_DELEGATE_CLASS, attach_ui_delegate};
pub use wake::main_thread_waker;
pub use webview::WebViewSink;
pub use window::{FOCUSABLE_PREFIX, make_focusable};

use crate::{
    bridge::Bridge,
    error::{Error, Result},
    handle::HandleId,
    main_ops::MainOp,
    script::Replier,
    sidebar::Node,
    types::TypeRegistry,
};

/// Runs one [`MainOp`] on the main thread.
pub type Executor = Box<dyn Fn(MainOp, &Replier)>;

thread_local! {
    /// The installed platform; only ever set on the main thread.
    static PLATFORM: RefCell<Option<Rc<Platform>>> = const { RefCell::new(None) };
}

/// Main-thread owner of the bridge and the runtime classes built for it.
pub struct Platform {
    /// Bridge state.
    bridge: Bridge,
    /// Synthesized classes.
    types: RefCell<TypeRegistry<ObjcRuntime>>,
    /// Applies main ops.
    executor: Executor,
    /// Outline item wrappers, kept alive while the outline may hold them.
    items: RefCell<HashMap<HandleId, Retained<NSNumber>>>,
}

impl Platform {
    /// Install `bridge` as the process platform and hook its waker to the
    /// main dispatch queue. Replaces (and drops) any previous platform.
    pub fn install(bridge: Bridge, executor: Executor) -> Result<Rc<Self>> {
        if MainThreadMarker::new().is_none() {
            return Err(Error::MainThread);
        }
        bridge.set_waker(main_thread_waker());
        let platform = Rc::new(Self {
            bridge,
            types: RefCell::new(TypeRegistry::new(ObjcRuntime)),
            executor,
            items: RefCell::new(HashMap::new()),
        });
        let previous = PLATFORM.with(|slot| slot.replace(Some(platform.clone())));
        if previous.is_some() {
            warn!("replacing installed bridge platform");
        }
        debug!("bridge platform installed");
        Ok(platform)
    }

    /// Drop the installed platform. Callbacks arriving later are ignored.
    pub fn teardown() {
        if PLATFORM.with(|slot| slot.borrow_mut().take()).is_some() {
            debug!("bridge platform torn down");
        }
    }

    /// The installed platform, if any. Always `None` off the main thread.
    pub fn current() -> Option<Rc<Self>> {
        PLATFORM.with(|slot| slot.borrow().clone())
    }

    /// Bridge state.
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Synthesized class registry.
    pub(crate) fn types(&self) -> RefMut<'_, TypeRegistry<ObjcRuntime>> {
        self.types.borrow_mut()
    }

    /// Deliver pending replies and apply pending main ops.
    pub fn flush(&self) {
        let mut ops = 0;
        loop {
            let batch = self.bridge.main_ops().drain();
            if batch.is_empty() {
                break;
            }
            let replier = self.bridge.replier();
            for op in batch {
                ops += 1;
                (self.executor)(op, &replier);
            }
        }
        let delivered = self.bridge.pump();
        if ops > 0 || delivered > 0 {
            trace!(ops, delivered, "flushed bridge");
        }
    }

    /// Stable wrapper object for `handle`.
    pub(crate) fn item_object(&self, handle: HandleId) -> Retained<NSNumber> {
        self.items
            .borrow_mut()
            .entry(handle)
            .or_insert_with(|| NSNumber::new_u64(handle.raw()))
            .clone()
    }

    /// Forget wrappers whose handles no longer resolve.
    pub(crate) fn prune_items(&self) {
        let sidebar = self.bridge.sidebar();
        self.items.borrow_mut().retain(|h, _| {
            sidebar.resolve(Node::Handle(*h)).is_some()
        });
    }
}

/// Run `f` with the installed platform, if there is one.
pub(crate) fn with_platform<T>(f: impl FnOnce(&Platform) -> T) -> Option<T> {
    let platform = Platform::current()?;
    Some(f(&platform))
}
