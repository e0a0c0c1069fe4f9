//! Native to script delivery.
//!
//! There is no synchronous return path into the script engine: every reply is
//! an injected evaluation that runs later. Handlers (on any thread) push
//! [`ScriptCall`]s through a [`Replier`]; the bridge drains the queue on the
//! UI thread and hands rendered snippets to a [`ScriptSink`].

use std::{cell::RefCell, rc::Rc, sync::Arc};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

/// Script function resolving a pending call by action name.
pub const RESULT_FN: &str = "window.__craftBridgeResult";
/// Script function failing all pending calls.
pub const ERROR_FN: &str = "window.__craftBridgeError";

/// Something that can evaluate script in the web view.
///
/// Implementations are fire-and-forget; they run on the UI thread.
pub trait ScriptSink {
    /// Queue `script` for evaluation.
    fn evaluate(&self, script: &str);
}

/// A single native to script delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCall {
    /// Resolve the caller waiting on `action`.
    Result {
        /// Action name the script side is waiting on.
        action: String,
        /// Result payload.
        payload: Value,
    },
    /// Fail pending callers.
    Error {
        /// Error text passed to the script error hook.
        message: String,
    },
    /// Dispatch a DOM `CustomEvent` on `window`.
    Event {
        /// Event name.
        name: String,
        /// Event `detail`.
        detail: Value,
    },
}

/// JSON-encode a string so it can be embedded as a script literal.
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

impl ScriptCall {
    /// Build a result delivery from any serializable payload.
    pub fn result(action: &str, payload: impl Serialize) -> Self {
        Self::Result {
            action: action.to_string(),
            payload: serde_json::to_value(payload).unwrap_or(Value::Null),
        }
    }

    /// Render the call as a script snippet.
    pub fn render(&self) -> String {
        match self {
            Self::Result { action, payload } => {
                format!("{RESULT_FN}({}, {});", js_str(action), payload)
            }
            Self::Error { message } => format!("{ERROR_FN}({});", js_str(message)),
            Self::Event { name, detail } => format!(
                "window.dispatchEvent(new CustomEvent({}, {{ detail: {} }}));",
                js_str(name),
                detail
            ),
        }
    }
}

/// Callback used to nudge the UI thread when replies are queued.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Shared, late-bound waker slot.
type WakerSlot = Arc<Mutex<Option<Waker>>>;

/// Cloneable, thread-safe handle for posting replies.
#[derive(Clone)]
pub struct Replier {
    /// Queue sender.
    tx: Sender<ScriptCall>,
    /// Wake hook shared with the owning queue.
    waker: WakerSlot,
}

impl Replier {
    /// Post a call and wake the UI thread.
    pub fn send(&self, call: ScriptCall) {
        if self.tx.send(call).is_err() {
            warn!("reply queue closed; dropping script call");
            return;
        }
        let waker = self.waker.lock().clone();
        if let Some(w) = waker {
            w();
        }
    }

    /// Resolve `action` with `payload`.
    pub fn result(&self, action: &str, payload: impl Serialize) {
        self.send(ScriptCall::result(action, payload));
    }

    /// Fail pending callers with `message`.
    pub fn error(&self, message: impl Into<String>) {
        self.send(ScriptCall::Error {
            message: message.into(),
        });
    }

    /// Dispatch a custom event.
    pub fn event(&self, name: &str, detail: Value) {
        self.send(ScriptCall::Event {
            name: name.to_string(),
            detail,
        });
    }
}

/// Receiving end of the reply path, owned by the bridge.
pub struct ReplyQueue {
    /// Sender cloned into repliers.
    tx: Sender<ScriptCall>,
    /// Drained on the UI thread.
    rx: Receiver<ScriptCall>,
    /// Wake hook.
    waker: WakerSlot,
}

impl Default for ReplyQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyQueue {
    /// Create an empty queue with no waker.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            waker: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for posting into this queue.
    pub fn replier(&self) -> Replier {
        Replier {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }

    /// Install the hook called after every post.
    pub fn set_waker(&self, waker: Waker) {
        *self.waker.lock() = Some(waker);
    }

    /// Take everything queued so far.
    pub fn drain(&self) -> Vec<ScriptCall> {
        self.rx.try_iter().collect()
    }

    /// Render and evaluate everything queued so far. Returns the count.
    pub fn pump(&self, sink: &dyn ScriptSink) -> usize {
        let mut n = 0;
        for call in self.rx.try_iter() {
            let script = call.render();
            trace!(script = %script, "evaluate");
            sink.evaluate(&script);
            n += 1;
        }
        n
    }
}

/// Sink that records scripts in memory.
///
/// Used by tests and by headless tools that print what would have been
/// evaluated.
#[derive(Default)]
pub struct MemorySink {
    /// Scripts in evaluation order.
    scripts: RefCell<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<String> {
        self.scripts.take()
    }

    /// Copy of everything recorded so far.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }
}

impl ScriptSink for MemorySink {
    fn evaluate(&self, script: &str) {
        self.scripts.borrow_mut().push(script.to_string());
    }
}

impl<T: ScriptSink + ?Sized> ScriptSink for Arc<T> {
    fn evaluate(&self, script: &str) {
        (**self).evaluate(script);
    }
}

impl<T: ScriptSink + ?Sized> ScriptSink for Rc<T> {
    fn evaluate(&self, script: &str) {
        (**self).evaluate(script);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    use serde_json::json;

    use super::*;

    #[test]
    fn renders_result_with_escaped_action() {
        let call = ScriptCall::result("read\"File", json!({"ok": true}));
        assert_eq!(
            call.render(),
            r#"window.__craftBridgeResult("read\"File", {"ok":true});"#
        );
    }

    #[test]
    fn renders_error_and_event() {
        let err = ScriptCall::Error {
            message: "line\nbreak".into(),
        };
        assert_eq!(err.render(), r#"window.__craftBridgeError("line\nbreak");"#);
        let ev = ScriptCall::Event {
            name: "craft:sidebar:select".into(),
            detail: json!({"itemId": "home"}),
        };
        assert_eq!(
            ev.render(),
            r#"window.dispatchEvent(new CustomEvent("craft:sidebar:select", { detail: {"itemId":"home"} }));"#
        );
    }

    #[test]
    fn replies_from_other_threads_are_pumped_in_order() {
        let q = ReplyQueue::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let w = wakes.clone();
        q.set_waker(Arc::new(move || {
            w.fetch_add(1, Ordering::SeqCst);
        }));
        let r = q.replier();
        thread::spawn(move || {
            r.result("a", 1);
            r.result("b", 2);
        })
        .join()
        .unwrap();
        let sink = MemorySink::new();
        assert_eq!(q.pump(&sink), 2);
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        let scripts = sink.take();
        assert!(scripts[0].contains("\"a\", 1"));
        assert!(scripts[1].contains("\"b\", 2"));
        assert_eq!(q.pump(&sink), 0);
    }
}
