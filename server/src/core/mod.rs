//! Core: configuration, shared state, server bootstrap

pub mod config;
pub mod server;
pub mod state;

pub use config::{Config, PaymentConfig};
pub use server::Server;
pub use state::ServerState;
