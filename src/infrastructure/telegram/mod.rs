pub mod client;

pub use client::TelegramNotifier;
