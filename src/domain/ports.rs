use crate::domain::errors::NotificationError;
use crate::domain::resonance::Destination;
use async_trait::async_trait;

/// Outbound channel for resonance alerts
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, destination: Destination, text: &str) -> Result<(), NotificationError>;
}
