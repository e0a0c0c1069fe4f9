//! The bridge owner.
//!
//! [`Bridge`] holds every piece of per-process bridge state: the router and
//! its handlers, the reply queue, the main-thread op queue and the sidebar
//! data source. It is created once at bridge setup on the UI thread and
//! dropped at teardown; nothing here is a free-floating global.

use std::cell::{Ref, RefCell, RefMut};

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::BridgeConfig,
    decision::Decision,
    error::Result,
    handler::{Context, HandlerRegistry},
    main_ops::MainOps,
    permission::MediaKind,
    router::{RouteOutcome, Router},
    script::{Replier, ReplyQueue, ScriptSink, Waker},
    sidebar::SidebarProxy,
};

/// Owner of all bridge state for one web view.
pub struct Bridge {
    /// Loaded configuration.
    config: BridgeConfig,
    /// Decoding and dispatch.
    router: Router,
    /// Native to script replies.
    replies: ReplyQueue,
    /// Work queued for the UI thread.
    main_ops: MainOps,
    /// Sidebar outline data source.
    sidebar: RefCell<SidebarProxy>,
    /// Script evaluation target.
    sink: Box<dyn ScriptSink>,
}

impl Bridge {
    /// Set up the bridge: construct every handler, load the configured
    /// sidebar (if any) and wire replies to `sink`.
    pub fn new(config: BridgeConfig, handlers: HandlerRegistry, sink: Box<dyn ScriptSink>) -> Self {
        handlers.init_all();
        debug!(handlers = ?handlers.kinds(), "bridge setup");
        let replies = ReplyQueue::new();
        let mut sidebar = SidebarProxy::new(replies.replier());
        if let Some(doc) = &config.sidebar
            && let Err(e) = sidebar.load_config(&doc.to_string())
        {
            debug!("configured sidebar ignored: {}", e);
        }
        let router = Router::new(handlers, config.quiet_actions.clone());
        Self {
            config,
            router,
            replies,
            main_ops: MainOps::new(),
            sidebar: RefCell::new(sidebar),
            sink,
        }
    }

    /// Route one raw message from script, then deliver any replies it
    /// produced synchronously.
    pub fn route(&self, raw: &str) -> RouteOutcome {
        let replier = self.replies.replier();
        let cx = Context {
            replier: &replier,
            main_ops: &self.main_ops,
        };
        let outcome = self.router.route(raw, &cx);
        self.pump();
        outcome
    }

    /// Deliver queued replies to script. Call on the UI thread.
    pub fn pump(&self) -> usize {
        self.replies.pump(self.sink.as_ref())
    }

    /// Install the hook used to schedule [`Self::pump`] and main-op draining
    /// on the UI thread when work completes elsewhere.
    pub fn set_waker(&self, waker: Waker) {
        self.replies.set_waker(waker.clone());
        self.main_ops.set_waker(waker);
    }

    /// Handle for posting replies from anywhere.
    pub fn replier(&self) -> Replier {
        self.replies.replier()
    }

    /// Queue of UI-thread operations.
    pub fn main_ops(&self) -> &MainOps {
        &self.main_ops
    }

    /// Active configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Router, for inspection.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Borrow the sidebar data source.
    pub fn sidebar(&self) -> Ref<'_, SidebarProxy> {
        self.sidebar.borrow()
    }

    /// Mutably borrow the sidebar data source.
    pub fn sidebar_mut(&self) -> RefMut<'_, SidebarProxy> {
        self.sidebar.borrow_mut()
    }

    /// Load a sidebar document, keeping the current tree on failure.
    pub fn load_sidebar(&self, json: &str) -> Result<usize> {
        self.sidebar.borrow_mut().load_config(json)
    }

    /// Load a sidebar document given as a JSON value.
    pub fn load_sidebar_value(&self, doc: &Value) -> Result<usize> {
        self.load_sidebar(&doc.to_string())
    }

    /// Decision for a media capture request with the toolkit's type `code`.
    pub fn media_decision(&self, code: i64) -> Decision {
        let kind = MediaKind::from_code(code);
        if kind.is_none() {
            warn!(code, "unknown media capture type");
        }
        self.config.permissions.decide(kind)
    }
}
