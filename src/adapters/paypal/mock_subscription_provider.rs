//! Mock subscription provider for testing.
//!
//! Supports:
//! - Refusing specific subscription ids (omitted from the result)
//! - Failing the whole batch
//! - Delaying the response (for timeout tests)
//! - Call tracking

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{PaymentError, SubscriptionProvider};

#[derive(Default, Clone)]
pub struct MockSubscriptionProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    refused: HashSet<String>,
    batch_error: Option<PaymentError>,
    delay: Option<Duration>,
    calls: Vec<Vec<String>>,
}

impl MockSubscriptionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The provider will not cancel `subscription_id`.
    pub fn refuse(&self, subscription_id: impl Into<String>) {
        self.state().refused.insert(subscription_id.into());
    }

    /// Every batch fails with `error`.
    pub fn fail_batch(&self, error: PaymentError) {
        self.state().batch_error = Some(error);
    }

    /// Every batch sleeps for `delay` before answering.
    pub fn delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// The id lists received, one entry per call.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SubscriptionProvider for MockSubscriptionProvider {
    async fn cancel_subscriptions(
        &self,
        subscription_ids: &[String],
    ) -> Result<Vec<String>, PaymentError> {
        let delay = {
            let mut state = self.state();
            state.calls.push(subscription_ids.to_vec());
            state.delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state();
        if let Some(error) = &state.batch_error {
            return Err(error.clone());
        }

        Ok(subscription_ids
            .iter()
            .filter(|id| !state.refused.contains(*id))
            .cloned()
            .collect())
    }
}
