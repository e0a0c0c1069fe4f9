//! Script evaluation in a `WKWebView`.

use block2::Block;
use objc2::{msg_send, rc::Weak, runtime::AnyObject};
use objc2_foundation::NSString;
use tracing::trace;

use crate::script::ScriptSink;

/// Completion handler type of `evaluateJavaScript:completionHandler:`.
type Completion = Block<dyn Fn(*mut AnyObject, *mut AnyObject)>;

/// Evaluates reply scripts in a web view without keeping it alive.
pub struct WebViewSink {
    /// Target web view.
    webview: Weak<AnyObject>,
}

impl WebViewSink {
    /// Sink for `webview`.
    ///
    /// # Safety
    /// `webview` must be a `WKWebView` and the sink must only be used on the
    /// main thread.
    pub unsafe fn new(webview: &AnyObject) -> Self {
        Self {
            webview: Weak::new(webview),
        }
    }
}

impl ScriptSink for WebViewSink {
    fn evaluate(&self, script: &str) {
        let Some(webview) = self.webview.load() else {
            trace!("web view released, dropping script");
            return;
        };
        let source = NSString::from_str(script);
        let completion: Option<&Completion> = None;
        // SAFETY: `new` guarantees a WKWebView used on the main thread; a nil
        // completion handler is allowed.
        unsafe {
            let _: () = msg_send![&*webview, evaluateJavaScript: &*source, completionHandler: completion];
        }
    }
}
