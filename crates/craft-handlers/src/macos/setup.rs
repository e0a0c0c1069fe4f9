//! Wiring a web view window to a bridge with the default handlers.

use std::rc::Rc;

use craft_bridge::{
    Bridge, BridgeConfig, Result,
    macos::{
        Platform, WebViewSink, attach_relay, attach_sidebar, attach_ui_delegate, make_focusable,
    },
};
use objc2::{rc::Retained, runtime::AnyObject};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::executor;
use crate::{HandlerDeps, default_registry};

/// Name script posts to, as in
/// `window.webkit.messageHandlers.craft.postMessage(msg)`.
pub const MESSAGE_HANDLER: &str = "craft";

/// The native views a bridge attaches to.
pub struct Views<'a> {
    /// The `WKWebView` hosting script.
    pub webview: &'a AnyObject,
    /// Its `NSWindow`, made able to become key when present.
    pub window: Option<&'a AnyObject>,
    /// Sidebar `NSOutlineView`, if the window has one.
    pub outline: Option<&'a AnyObject>,
}

/// Objects created by [`attach`]. Keep them alive as long as the views.
pub struct Attached {
    /// The installed platform.
    pub platform: Rc<Platform>,
    /// Script message relay.
    pub relay: Retained<AnyObject>,
    /// Media permission delegate.
    pub ui_delegate: Retained<AnyObject>,
    /// Sidebar data source, when an outline was given.
    pub sidebar: Option<Retained<AnyObject>>,
}

/// Build a bridge over the default handlers, install it and attach it to
/// `views`. On failure the platform is torn down again.
///
/// # Safety
/// The views must be the AppKit/WebKit classes documented on [`Views`] and
/// this must run on the main thread.
pub unsafe fn attach(views: &Views<'_>, config: BridgeConfig, runtime: Handle) -> Result<Attached> {
    let deps = HandlerDeps::new(runtime, &config);
    // SAFETY: `views.webview` is a WKWebView per the caller contract.
    let sink = unsafe { WebViewSink::new(views.webview) };
    let bridge = Bridge::new(config, default_registry(&deps), Box::new(sink));
    let platform = Platform::install(bridge, executor(deps.tray_actions.clone()))?;
    // SAFETY: forwarded caller contract.
    match unsafe { attach_views(&platform, views) } {
        Ok((relay, ui_delegate, sidebar)) => {
            debug!(sidebar = sidebar.is_some(), "bridge attached");
            Ok(Attached {
                platform,
                relay,
                ui_delegate,
                sidebar,
            })
        }
        Err(e) => {
            warn!("bridge attach failed: {}", e);
            Platform::teardown();
            Err(e)
        }
    }
}

/// Delegates and data sources created for one set of views.
type AttachedViews = (
    Retained<AnyObject>,
    Retained<AnyObject>,
    Option<Retained<AnyObject>>,
);

/// Attach every platform object to `views`.
///
/// # Safety
/// As for [`attach`].
unsafe fn attach_views(platform: &Platform, views: &Views<'_>) -> Result<AttachedViews> {
    // SAFETY: forwarded caller contract.
    unsafe {
        let relay = attach_relay(platform, views.webview, MESSAGE_HANDLER)?;
        let ui_delegate = attach_ui_delegate(platform, views.webview)?;
        if let Some(window) = views.window
            && !make_focusable(platform, window)?
        {
            warn!("window keeps its default focus behavior");
        }
        let sidebar = match views.outline {
            Some(outline) => Some(attach_sidebar(platform, outline)?),
            None => None,
        };
        Ok((relay, ui_delegate, sidebar))
    }
}
