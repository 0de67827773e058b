use reqwest::Client;
use std::time::Duration;
use tracing::warn;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the HTTP client used for outbound notifications.
    ///
    /// No retry middleware: each alert is attempted at most once, and the
    /// request timeout bounds how long a send can hold its symbol.
    pub fn create_client(request_timeout: Duration) -> Client {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(request_timeout)
            .connect_timeout(request_timeout.min(Duration::from_secs(10)))
            .build()
            .unwrap_or_else(|e| {
                warn!("HttpClientFactory: falling back to default client: {}", e);
                Client::new()
            })
    }
}
