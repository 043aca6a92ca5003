//! Core library for biblio, a client for the library management API.
//!
//! - `api`: authenticated request pipeline with transparent token refresh
//! - `auth`: the session and the login/logout/refresh lifecycle
//! - `guard`: route table and navigation guard
//! - `stores`: cached books, loans, users and categories
//! - `store`: persistent key-value storage for the session
//! - `models`: records exchanged with the server
//! - `config`: client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod store;
pub mod stores;

use std::time::Duration;

use anyhow::Result;

pub use api::{ApiClient, ApiError, NavigationEvent};
pub use auth::{AuthManager, AuthState, Session, SessionHandle};
pub use config::{Config, SessionBackend};
pub use guard::{GuardDecision, RouteGuard};

/// Everything a front end needs, wired from one configuration.
#[derive(Clone)]
pub struct Client {
    pub api: ApiClient,
    pub auth: AuthManager,
    pub guard: RouteGuard,
}

impl Client {
    /// Hydrate the session from the configured store and build the client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = store::open(config.session_backend, &config.cache_dir()?);
        let session = SessionHandle::hydrate(store);
        Self::with_session(config, session)
    }

    pub fn with_session(config: &Config, session: SessionHandle) -> Result<Self> {
        let api = ApiClient::new(
            config.api_base(),
            Duration::from_secs(config.request_timeout_secs),
            session,
        )?;
        Ok(Self {
            auth: AuthManager::new(api.clone()),
            guard: RouteGuard::default(),
            api,
        })
    }

    pub fn books(&self) -> stores::BookStore {
        stores::BookStore::new(self.api.clone())
    }

    pub fn loans(&self) -> stores::LoanStore {
        stores::LoanStore::new(self.api.clone())
    }

    pub fn users(&self) -> stores::UserStore {
        stores::UserStore::new(self.api.clone())
    }

    pub fn categories(&self) -> stores::CategoryStore {
        stores::CategoryStore::new(self.api.clone())
    }

    /// Guard a navigation against the current session.
    pub async fn navigate(&self, target: &str) -> guard::Navigation {
        let state = self.api.session().auth_state().await;
        self.guard.check(target, state)
    }
}
