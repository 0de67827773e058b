use crate::domain::errors::NotificationError;
use crate::domain::ports::NotificationService;
use crate::domain::resonance::Destination;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// A message captured by [`MockNotificationService`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub destination: Destination,
    pub text: String,
}

/// In-memory notifier for tests and dry runs.
///
/// Records every successful send. Destinations listed with
/// [`failing_for`](Self::failing_for) reject their messages, and
/// [`with_delay`](Self::with_delay) slows every send down.
#[derive(Clone, Default)]
pub struct MockNotificationService {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    attempts: Arc<Mutex<usize>>,
    failing: HashSet<Destination>,
    delay: Option<Duration>,
    slow: HashSet<Destination>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, destination: Destination) -> Self {
        self.failing.insert(destination);
        self
    }

    /// Delays sends. With no destination given via [`slow_for`](Self::slow_for)
    /// every send is delayed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn slow_for(mut self, destination: Destination) -> Self {
        self.slow.insert(destination);
        self
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, destination: Destination) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.destination == destination)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Number of send calls, successful or not
    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl NotificationService for MockNotificationService {
    async fn send(&self, destination: Destination, text: &str) -> Result<(), NotificationError> {
        *self.attempts.lock().await += 1;

        if let Some(delay) = self.delay
            && (self.slow.is_empty() || self.slow.contains(&destination))
        {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&destination) {
            return Err(NotificationError::Rejected {
                status: 400,
                body: format!("mock rejection for {}", destination),
            });
        }

        info!("MockNotificationService: {} <- {}", destination, text.lines().next().unwrap_or(""));
        self.sent.lock().await.push(SentMessage {
            destination,
            text: text.to_string(),
        });
        Ok(())
    }
}
