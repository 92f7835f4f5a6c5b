//! Account API - account registration and self-service management over REST.
//!
//! The crate is organised in layers:
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Account entity, password value object and domain errors
//! - **services**: Account use cases and bearer token authentication
//! - **infra**: Database connection, migrations and repositories
//! - **api**: HTTP handlers, extractors, routes and OpenAPI docs
//! - **types**: Shared response envelopes
//! - **errors**: HTTP-facing error type
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Account, AccountError, AccountErrorKind, AccountId, AccountView, Password};
pub use errors::{AppError, AppResult};
