//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and migrations
//! - Account repository

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{AccountRepository, AccountStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockAccountRepository;
