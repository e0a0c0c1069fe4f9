//! Routing of raw script messages to handlers.

use tracing::{debug, error, info, trace, warn};

use crate::{
    decode::DecoderChain,
    error::Error,
    handler::{Context, HandlerRegistry},
    message::{BridgeMessage, DEBUG_TYPE},
};

/// What happened to a routed message.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The handler ran the action successfully.
    Handled,
    /// A `debug` message was logged; nothing was dispatched.
    Logged,
    /// The message was dropped before reaching a handler.
    Dropped(Error),
    /// The handler ran and failed.
    Failed(Error),
}

impl RouteOutcome {
    /// True if a handler was invoked (successfully or not).
    pub fn dispatched(&self) -> bool {
        matches!(self, Self::Handled | Self::Failed(_))
    }
}

/// Decodes raw payloads and dispatches them by `type`.
pub struct Router {
    /// Decoder strategies in priority order.
    decoders: DecoderChain,
    /// Handlers by type.
    handlers: HandlerRegistry,
    /// Actions logged at trace level.
    quiet_actions: Vec<String>,
}

impl Router {
    /// Router over `handlers` with the default decoder chain.
    pub fn new(handlers: HandlerRegistry, quiet_actions: Vec<String>) -> Self {
        Self::with_decoders(DecoderChain::default(), handlers, quiet_actions)
    }

    /// Router with an explicit decoder chain.
    pub fn with_decoders(
        decoders: DecoderChain,
        handlers: HandlerRegistry,
        quiet_actions: Vec<String>,
    ) -> Self {
        Self {
            decoders,
            handlers,
            quiet_actions,
        }
    }

    /// Registered handlers.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// True if `action` is logged at trace level only.
    pub fn is_quiet(&self, action: &str) -> bool {
        self.quiet_actions.iter().any(|a| a == action)
    }

    /// Decode `raw` and dispatch it. Never fails: every problem is logged
    /// and reported in the outcome, and the router stays usable.
    pub fn route(&self, raw: &str, cx: &Context<'_>) -> RouteOutcome {
        let msg = match self.decoders.decode(raw) {
            Ok(m) => m,
            Err(e) => {
                warn!("dropping bridge message: {}", e);
                return RouteOutcome::Dropped(e);
            }
        };
        self.dispatch(&msg, cx)
    }

    /// Dispatch an already decoded message.
    pub fn dispatch(&self, msg: &BridgeMessage, cx: &Context<'_>) -> RouteOutcome {
        if msg.kind == DEBUG_TYPE {
            info!(target: "craft::script", "{}", msg.debug_text());
            return RouteOutcome::Logged;
        }
        if self.is_quiet(&msg.action) {
            trace!(kind = %msg.kind, action = %msg.action, "bridge message");
        } else {
            debug!(kind = %msg.kind, action = %msg.action, "bridge message");
        }
        let Some(handler) = self.handlers.get(&msg.kind) else {
            warn!(kind = %msg.kind, "no handler for bridge message type");
            return RouteOutcome::Dropped(Error::UnknownType(msg.kind.clone()));
        };
        match handler.handle_message(&msg.action, msg.data(), cx) {
            Ok(()) => RouteOutcome::Handled,
            Err(e) => {
                error!(kind = %msg.kind, action = %msg.action, "handler failed: {}", e);
                if handler.replies_to(&msg.action) {
                    cx.replier.error(e.to_string());
                }
                RouteOutcome::Failed(e)
            }
        }
    }
}
