pub mod http_client_factory;
pub mod mock;
pub mod telegram;
pub mod tradingview;

pub use http_client_factory::HttpClientFactory;
pub use mock::{MockNotificationService, SentMessage};
pub use telegram::TelegramNotifier;
