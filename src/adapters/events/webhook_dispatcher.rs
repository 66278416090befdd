//! WebhookDispatcher - Bounded fan-out of verified events to handlers.
//!
//! Each (event, handler) pair runs on its own Tokio task. A semaphore caps
//! how many run at once; `dispatch` waits for a permit before spawning, so a
//! burst of notifications applies backpressure instead of piling up tasks.
//!
//! Handler errors are never dropped: they are sent on the failure channel
//! returned by [`WebhookDispatcher::new`] and logged by
//! [`spawn_failure_logger`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

use crate::domain::foundation::DomainError;
use crate::domain::webhook::WebhookEvent;
use crate::ports::WebhookEventHandler;

/// Default number of handler tasks allowed to run concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

const FAILURE_CHANNEL_CAPACITY: usize = 256;

/// A handler that returned an error for an event.
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    pub event_id: String,
    pub event_type: String,
    pub handler: &'static str,
    pub error: DomainError,
}

pub struct WebhookDispatcher {
    handlers: HashMap<String, Vec<Arc<dyn WebhookEventHandler>>>,
    permits: Arc<Semaphore>,
    failures: mpsc::Sender<HandlerFailure>,
}

impl WebhookDispatcher {
    /// Creates a dispatcher and the receiving end of its failure channel.
    pub fn new(max_concurrency: usize) -> (Self, mpsc::Receiver<HandlerFailure>) {
        let (failures, failures_rx) = mpsc::channel(FAILURE_CHANNEL_CAPACITY);
        let dispatcher = Self {
            handlers: HashMap::new(),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            failures,
        };
        (dispatcher, failures_rx)
    }

    /// Subscribes `handler` to every event type it declares.
    pub fn register(&mut self, handler: Arc<dyn WebhookEventHandler>) {
        for event_type in handler.event_types() {
            self.handlers
                .entry(event_type.as_str().to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }

    /// Number of handlers subscribed to `event_type`.
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, Vec::len)
    }

    /// Spawns one task per subscribed handler and returns their handles.
    ///
    /// Events nobody subscribes to are logged and dropped.
    pub async fn dispatch(&self, event: WebhookEvent) -> Vec<JoinHandle<()>> {
        let event_type = event.event_type.as_str().to_string();
        let Some(handlers) = self.handlers.get(&event_type) else {
            tracing::info!(event_id = %event.id, event_type = %event_type, "No handler for webhook event");
            return Vec::new();
        };

        let mut tasks = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!(event_id = %event.id, "Dispatcher closed; dropping event");
                    break;
                }
            };

            let handler = Arc::clone(handler);
            let event = event.clone();
            let failures = self.failures.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let event_id = event.id.clone();
                let event_type = event.event_type.as_str().to_string();

                if let Err(error) = handler.handle(event).await {
                    let failure = HandlerFailure {
                        event_id,
                        event_type,
                        handler: handler.name(),
                        error,
                    };
                    if let Err(mpsc::error::SendError(failure)) = failures.send(failure).await {
                        tracing::error!(
                            event_id = %failure.event_id,
                            handler = failure.handler,
                            error = %failure.error,
                            "Webhook handler failed (failure channel closed)"
                        );
                    }
                }
            }));
        }

        tasks
    }
}

/// Drains the failure channel, logging every handler error.
pub fn spawn_failure_logger(mut failures: mpsc::Receiver<HandlerFailure>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            tracing::error!(
                event_id = %failure.event_id,
                event_type = %failure.event_type,
                handler = failure.handler,
                error = %failure.error,
                "Webhook handler failed"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::webhook::WebhookEventType;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct TestHandler {
        name: &'static str,
        types: Vec<WebhookEventType>,
        calls: AtomicUsize,
        running: AtomicUsize,
        max_running: AtomicUsize,
        fail: bool,
    }

    impl TestHandler {
        fn new(name: &'static str, types: Vec<WebhookEventType>) -> Self {
            Self {
                name,
                types,
                calls: AtomicUsize::new(0),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing(name: &'static str, types: Vec<WebhookEventType>) -> Self {
            Self {
                fail: true,
                ..Self::new(name, types)
            }
        }
    }

    #[async_trait]
    impl WebhookEventHandler for TestHandler {
        async fn handle(&self, _event: WebhookEvent) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                return Err(DomainError::new(ErrorCode::InternalError, "boom"));
            }
            Ok(())
        }

        fn event_types(&self) -> Vec<WebhookEventType> {
            self.types.clone()
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn event(id: &str, event_type: WebhookEventType) -> WebhookEvent {
        WebhookEvent {
            id: id.to_string(),
            event_type,
            resource: Value::Null,
        }
    }

    async fn join_all(tasks: Vec<JoinHandle<()>>) {
        for task in tasks {
            task.await.unwrap();
        }
    }

    #[tokio::test]
    async fn routes_event_to_subscribed_handlers_only() {
        let (mut dispatcher, _rx) = WebhookDispatcher::new(4);
        let payments = Arc::new(TestHandler::new(
            "payments",
            vec![WebhookEventType::PaymentSaleCompleted],
        ));
        let cancellations = Arc::new(TestHandler::new(
            "cancellations",
            vec![WebhookEventType::SubscriptionCancelled],
        ));
        dispatcher.register(payments.clone());
        dispatcher.register(cancellations.clone());

        let tasks = dispatcher
            .dispatch(event("WH-1", WebhookEventType::PaymentSaleCompleted))
            .await;
        join_all(tasks).await;

        assert_eq!(payments.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cancellations.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unhandled_event_spawns_nothing() {
        let (dispatcher, _rx) = WebhookDispatcher::new(4);
        let tasks = dispatcher
            .dispatch(event("WH-1", WebhookEventType::Unknown("X.Y".into())))
            .await;
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn handler_errors_arrive_on_failure_channel() {
        let (mut dispatcher, mut rx) = WebhookDispatcher::new(4);
        dispatcher.register(Arc::new(TestHandler::failing(
            "broken",
            vec![WebhookEventType::SubscriptionExpired],
        )));

        let tasks = dispatcher
            .dispatch(event("WH-9", WebhookEventType::SubscriptionExpired))
            .await;
        join_all(tasks).await;

        let failure = rx.recv().await.unwrap();
        assert_eq!(failure.event_id, "WH-9");
        assert_eq!(failure.handler, "broken");
        assert_eq!(failure.event_type, "BILLING.SUBSCRIPTION.EXPIRED");
    }

    #[tokio::test]
    async fn concurrency_is_bounded_by_permits() {
        let (mut dispatcher, _rx) = WebhookDispatcher::new(2);
        let handler = Arc::new(TestHandler::new(
            "slow",
            vec![WebhookEventType::PaymentSaleCompleted],
        ));
        dispatcher.register(handler.clone());

        let mut tasks = Vec::new();
        for i in 0..6 {
            tasks.extend(
                dispatcher
                    .dispatch(event(&format!("WH-{}", i), WebhookEventType::PaymentSaleCompleted))
                    .await,
            );
        }
        join_all(tasks).await;

        assert_eq!(handler.calls.load(Ordering::SeqCst), 6);
        assert!(handler.max_running.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn handler_registered_for_several_types() {
        let (mut dispatcher, _rx) = WebhookDispatcher::new(4);
        dispatcher.register(Arc::new(TestHandler::new(
            "ender",
            vec![
                WebhookEventType::SubscriptionCancelled,
                WebhookEventType::SubscriptionExpired,
            ],
        )));

        assert_eq!(dispatcher.handler_count("BILLING.SUBSCRIPTION.CANCELLED"), 1);
        assert_eq!(dispatcher.handler_count("BILLING.SUBSCRIPTION.EXPIRED"), 1);
        assert_eq!(dispatcher.handler_count("PAYMENT.SALE.COMPLETED"), 0);
    }
}
