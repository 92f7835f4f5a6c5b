//! Application state - Dependency injection container.
//!
//! Provides centralized access to the account service, the bearer token
//! authenticator and the database handle used by the health check.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{AccountStore, Database};
use crate::services::{AccountManager, AccountService, Authenticator, JwtAuthenticator};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Account use cases
    pub account_service: Arc<dyn AccountService>,
    /// Bearer token verification
    pub authenticator: Arc<dyn Authenticator>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the production services on top of a database connection.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let repo = Arc::new(AccountStore::new(database.get_connection()));

        Self {
            account_service: Arc::new(AccountManager::new(repo)),
            authenticator: Arc::new(JwtAuthenticator::new(config)),
            database,
        }
    }

    /// Create application state with manually injected services.
    pub fn new(
        account_service: Arc<dyn AccountService>,
        authenticator: Arc<dyn Authenticator>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            account_service,
            authenticator,
            database,
        }
    }
}
