// Inbound transports feeding the symbol dispatcher
pub mod stdin;
pub mod webhook;
