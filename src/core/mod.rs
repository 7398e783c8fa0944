pub mod backends;
pub mod catalog;
pub mod chat_dispatch;
pub mod config;
pub mod message;
pub mod overlay;
pub mod router;
pub mod session;
