//! Core module: configuration, state and the HTTP server
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - shared services, built once at startup
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup and serving errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
