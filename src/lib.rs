pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod shutdown;
pub mod store;
