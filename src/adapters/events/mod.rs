//! Event dispatch adapters.
//!
//! - `WebhookDispatcher` - Bounded fan-out of verified provider events to
//!   registered handlers, with an explicit failure channel

mod webhook_dispatcher;

pub use webhook_dispatcher::{
    spawn_failure_logger, HandlerFailure, WebhookDispatcher, DEFAULT_MAX_CONCURRENCY,
};
