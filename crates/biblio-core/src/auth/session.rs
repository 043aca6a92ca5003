use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::User;
use crate::store::{KeyValueStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

/// In-memory session state.
///
/// `user` and `access_token` are always both present or both absent.
/// `loading` and `last_error` are transient and never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(|u| u.is_admin).unwrap_or(false)
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            authenticated: self.is_authenticated(),
            admin: self.is_admin(),
        }
    }

    fn credentials_only(&self) -> Session {
        Session {
            user: self.user.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            ..Default::default()
        }
    }
}

/// The two flags navigation decisions depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthState {
    pub authenticated: bool,
    pub admin: bool,
}

/// Shared, write-through handle to the session.
///
/// Clone is cheap; all clones see the same state. Every mutation is written
/// to the backing store before the call returns, while the state lock is
/// held, so the two copies never diverge between operations.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    store: Arc<dyn KeyValueStore>,
}

impl SessionHandle {
    /// Empty session over `store`. The store is not read.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Session::default())),
            store,
        }
    }

    /// Build a session from whatever `store` holds.
    ///
    /// Anything short of a decodable user plus an access token is treated
    /// as no session, and the leftover keys are removed from the store.
    pub fn hydrate(store: Arc<dyn KeyValueStore>) -> Self {
        let session = match Self::read_persisted(store.as_ref()) {
            Ok(Some(session)) => {
                debug!(user_id = ?session.user.as_ref().map(|u| &u.id), "Session restored");
                session
            }
            Ok(None) => {
                if let Err(e) = write_persisted(store.as_ref(), &Session::default()) {
                    warn!(error = %e, "Failed to clear stale session keys");
                }
                Session::default()
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session");
                if let Err(e) = write_persisted(store.as_ref(), &Session::default()) {
                    warn!(error = %e, "Failed to clear stale session keys");
                }
                Session::default()
            }
        };

        Self {
            inner: Arc::new(RwLock::new(session)),
            store,
        }
    }

    fn read_persisted(store: &dyn KeyValueStore) -> Result<Option<Session>, StoreError> {
        let user = store.get(USER_KEY)?;
        let access_token = store.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty());
        let refresh_token = store.get(REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty());

        match (user, access_token) {
            (Some(user), Some(access_token)) => {
                let user: User = serde_json::from_str(&user)?;
                Ok(Some(Session {
                    user: Some(user),
                    access_token: Some(access_token),
                    refresh_token,
                    ..Default::default()
                }))
            }
            _ => Ok(None),
        }
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn auth_state(&self) -> AuthState {
        self.inner.read().await.auth_state()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.inner.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.read().await.refresh_token.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.loading
    }

    /// Install a freshly authenticated identity.
    ///
    /// On a store failure the previous persisted state is put back and the
    /// in-memory session is left untouched.
    pub async fn establish(
        &self,
        user: User,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<(), StoreError> {
        let mut session = self.inner.write().await;
        let next = Session {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token,
            ..Default::default()
        };

        if let Err(e) = write_persisted(self.store.as_ref(), &next) {
            if let Err(restore) = write_persisted(self.store.as_ref(), &session.credentials_only()) {
                warn!(error = %restore, "Failed to restore previous session after write failure");
            }
            return Err(e);
        }

        session.user = next.user;
        session.access_token = next.access_token;
        session.refresh_token = next.refresh_token;
        Ok(())
    }

    /// Replace the access token minted from `used_refresh_token`.
    ///
    /// Returns `false` without touching anything if the session no longer
    /// holds that refresh token (logged out, or logged in again while the
    /// refresh was in flight), so a late refresh cannot resurrect state.
    pub async fn rotate_access_token(
        &self,
        used_refresh_token: &str,
        access_token: String,
    ) -> Result<bool, StoreError> {
        let mut session = self.inner.write().await;
        if session.user.is_none() || session.refresh_token.as_deref() != Some(used_refresh_token) {
            debug!("Ignoring refreshed token for a session that has since changed");
            return Ok(false);
        }

        self.store.set(ACCESS_TOKEN_KEY, &access_token)?;
        session.access_token = Some(access_token);
        Ok(true)
    }

    /// Replace the stored user record of the current session.
    ///
    /// Returns `false` if nobody is logged in.
    pub async fn update_user(&self, user: User) -> Result<bool, StoreError> {
        let mut session = self.inner.write().await;
        if session.user.is_none() {
            return Ok(false);
        }

        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        session.user = Some(user);
        Ok(true)
    }

    /// Drop the user and both tokens, in memory and in the store.
    ///
    /// Memory is always cleared; a store error is reported after every key
    /// removal has been attempted.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut session = self.inner.write().await;
        session.user = None;
        session.access_token = None;
        session.refresh_token = None;
        write_persisted(self.store.as_ref(), &Session::default())
    }

    /// Mark the start of a user-facing operation.
    pub async fn begin_operation(&self) {
        let mut session = self.inner.write().await;
        session.loading = true;
        session.last_error = None;
    }

    /// Mark the end of a user-facing operation, recording its error message.
    pub async fn end_operation(&self, error: Option<String>) {
        let mut session = self.inner.write().await;
        session.loading = false;
        if error.is_some() {
            session.last_error = error;
        }
    }
}

/// Write every persisted key of `session`, removing the absent ones.
fn write_persisted(store: &dyn KeyValueStore, session: &Session) -> Result<(), StoreError> {
    let user = session.user.as_ref().map(serde_json::to_string).transpose()?;

    let mut first_error = None;
    for (key, value) in [
        (USER_KEY, user.as_deref()),
        (ACCESS_TOKEN_KEY, session.access_token.as_deref()),
        (REFRESH_TOKEN_KEY, session.refresh_token.as_deref()),
    ] {
        let result = match value {
            Some(value) => store.set(key, value),
            None => store.remove(key),
        };
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
