//! Login, registration, logout, token refresh and password change.
//!
//! Every operation raises the session's `loading` flag for its duration
//! and clears `last_error` on entry. Failures record a display message in
//! `last_error` (the server's own message when it sent one) and are also
//! returned to the caller.

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::SessionHandle;
use crate::api::{extract_message, Acknowledgement, ApiClient, ApiError, ApiRequest};
use crate::guard::{HOME_PATH, LOGIN_PATH};
use crate::models::{Credentials, PasswordChange, Registration, User};

const LOGIN_FAILED: &str = "An error occurred while logging in";
const REGISTER_FAILED: &str = "An error occurred while registering";
const CHANGE_PASSWORD_FAILED: &str = "An error occurred while changing the password";
const REFRESH_FAILED: &str = "Your session has expired, please log in again";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "utilisateur")]
    user: User,
    tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    #[serde(rename = "token_acces")]
    access_token: String,
    #[serde(rename = "token_rafraichissement", default)]
    refresh_token: Option<String>,
}

/// Orchestrates the session lifecycle over the API client.
#[derive(Clone)]
pub struct AuthManager {
    api: ApiClient,
    session: SessionHandle,
}

impl AuthManager {
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Run `operation` with the loading flag raised, recording its failure.
    async fn tracked<T>(
        &self,
        default_message: &str,
        operation: impl std::future::Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        self.session.begin_operation().await;
        let result = operation.await;
        let error = result.as_ref().err().map(|e| extract_message(e, default_message));
        self.session.end_operation(error).await;
        result
    }

    /// Log in and return where to navigate next: `redirect` if the guard
    /// sent the user here from a protected page, otherwise home.
    ///
    /// The session is left untouched on failure.
    pub async fn login(
        &self,
        credentials: &Credentials,
        redirect: Option<&str>,
    ) -> Result<String, ApiError> {
        self.tracked(LOGIN_FAILED, async {
            let request = ApiRequest::post("/auth/login").json(credentials)?;
            let response: LoginResponse = self.api.send_direct(request, None).await?;

            let user_id = response.user.id.clone();
            self.session
                .establish(
                    response.user,
                    response.tokens.access_token,
                    response.tokens.refresh_token,
                )
                .await?;
            info!(user_id = %user_id, "Logged in");

            Ok::<_, ApiError>(
                redirect
                    .filter(|path| path.starts_with('/') && !path.starts_with("//"))
                    .unwrap_or(HOME_PATH)
                    .to_string(),
            )
        })
        .await
    }

    /// Create an account. On success the caller should go to the login page.
    pub async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        self.tracked(REGISTER_FAILED, async {
            let request = ApiRequest::post("/auth/register").json(registration)?;
            let _: Acknowledgement = self.api.send_direct(request, None).await?;
            info!(email = %registration.email, "Account registered");
            Ok::<_, ApiError>(LOGIN_PATH.to_string())
        })
        .await
    }

    /// End the session. Always succeeds and returns the login page.
    ///
    /// The server is told first, best-effort; the local session is cleared
    /// whatever it answers.
    pub async fn logout(&self) -> String {
        self.session.begin_operation().await;

        if let Some(token) = self.session.access_token().await {
            let result: Result<Acknowledgement, ApiError> = self
                .api
                .send_direct(ApiRequest::post("/auth/logout"), Some(&token))
                .await;
            if let Err(e) = result {
                warn!(error = %e, "Server-side logout failed");
            }
        }

        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.session.end_operation(None).await;
        info!("Logged out");

        LOGIN_PATH.to_string()
    }

    /// Mint a new access token from the stored refresh token.
    ///
    /// Shares the pipeline's refresh lock, so it never races a refresh
    /// triggered by a rejected request. Without a refresh token, or if the
    /// server rejects it, the session is ended exactly as by `logout` and
    /// the failure is returned. A token that arrives after the session was
    /// ended or replaced is discarded.
    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        self.session.begin_operation().await;

        match self.api.refresh_session().await {
            Ok(Some(access_token)) => {
                self.session.end_operation(None).await;
                Ok(access_token)
            }
            Ok(None) => {
                debug!("Session changed during refresh");
                self.session.end_operation(None).await;
                Err(ApiError::AuthenticationExpired(None))
            }
            Err(e) => {
                self.logout().await;
                self.session
                    .end_operation(Some(extract_message(&e, REFRESH_FAILED)))
                    .await;
                Err(e)
            }
        }
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        self.tracked(CHANGE_PASSWORD_FAILED, async {
            let token = self.session.access_token().await;
            let request = ApiRequest::post("/auth/change-password").json(change)?;
            let _: Acknowledgement = self.api.send_direct(request, token.as_deref()).await?;
            Ok::<_, ApiError>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::guard::{GuardDecision, RouteGuard};
    use crate::store::{KeyValueStore, MemoryStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager(server: &MockServer) -> (AuthManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let session = SessionHandle::new(store.clone());
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5), session).unwrap();
        (AuthManager::new(api), store)
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "u1@example.org".into(),
            password: "p".into(),
        }
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "u1@example.org", "mot_de_passe": "p"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statut": "succes",
                "message": "Connexion réussie",
                "utilisateur": {"id": "u1", "prenom": "Ada", "nom": "L", "est_admin": false},
                "tokens": {"token_acces": "access-1", "token_rafraichissement": "refresh-1"}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_populates_session_and_allows_profile() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        let (auth, store) = manager(&server);

        let destination = auth.login(&credentials(), None).await.unwrap();
        assert_eq!(destination, HOME_PATH);

        let session = auth.session().snapshot().await;
        assert_eq!(session.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert!(!session.loading);
        assert!(session.last_error.is_none());
        assert!(!store.get(ACCESS_TOKEN_KEY).unwrap().unwrap_or_default().is_empty());
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));

        let guard = RouteGuard::default();
        let nav = guard.check("/profile", auth.session().auth_state().await);
        assert_eq!(nav.decision, GuardDecision::Allow);
    }

    #[tokio::test]
    async fn test_login_returns_intended_destination() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        let (auth, _) = manager(&server);

        let destination = auth.login(&credentials(), Some("/loans/active")).await.unwrap();
        assert_eq!(destination, "/loans/active");
    }

    #[tokio::test]
    async fn test_login_ignores_offsite_redirect() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        let (auth, _) = manager(&server);

        let destination = auth.login(&credentials(), Some("//evil.example")).await.unwrap();
        assert_eq!(destination, HOME_PATH);
    }

    #[tokio::test]
    async fn test_login_failure_sets_error_and_leaves_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statut": "erreur", "message": "Email ou mot de passe incorrect"
            })))
            .mount(&server)
            .await;
        // A bad password must never be mistaken for an expired token
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (auth, store) = manager(&server);

        let result = auth.login(&credentials(), None).await;
        assert!(result.is_err());

        let session = auth.session().snapshot().await;
        assert_eq!(session.last_error.as_deref(), Some("Email ou mot de passe incorrect"));
        assert!(!session.loading);
        assert!(session.user.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_login_network_failure_uses_default_message() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionHandle::new(store);
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2), session).unwrap();
        let auth = AuthManager::new(api);

        assert!(auth.login(&credentials(), None).await.is_err());
        assert_eq!(auth.session().last_error().await.as_deref(), Some(LOGIN_FAILED));
    }

    #[tokio::test]
    async fn test_register_navigates_to_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "statut": "succes", "message": "Utilisateur inscrit avec succès",
                "utilisateur": {"id": 2}
            })))
            .mount(&server)
            .await;
        let (auth, _) = manager(&server);

        let registration = Registration {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.org".into(),
            password: "longenough".into(),
        };
        assert_eq!(auth.register(&registration).await.unwrap(), LOGIN_PATH);
        assert!(!auth.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_register_validation_failure_uses_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statut": "erreur", "erreurs": {"email": ["Not a valid email address."]}
            })))
            .mount(&server)
            .await;
        let (auth, _) = manager(&server);

        let registration = Registration {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "nope".into(),
            password: "x".into(),
        };
        assert!(auth.register(&registration).await.is_err());
        assert_eq!(auth.session().last_error().await.as_deref(), Some(REGISTER_FAILED));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(header("Authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let (auth, store) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();

        let destination = auth.logout().await;
        assert_eq!(destination, LOGIN_PATH);

        let session = auth.session().snapshot().await;
        assert!(session.user.is_none());
        assert!(session.access_token.is_none());
        assert!(session.refresh_token.is_none());
        assert!(!session.loading);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_logout_without_session_skips_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (auth, _) = manager(&server);

        assert_eq!(auth.logout().await, LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_refresh_access_token_overwrites_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("Authorization", "Bearer refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statut": "succes", "token_acces": "access-2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        let (auth, store) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();

        let token = auth.refresh_access_token().await.unwrap();
        assert_eq!(token, "access-2");
        assert_eq!(auth.session().access_token().await.as_deref(), Some("access-2"));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("access-2"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_refresh_clears_stale_error() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statut": "succes", "token_acces": "access-2"
            })))
            .mount(&server)
            .await;
        let (auth, _) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();
        auth.session().end_operation(Some("stale".to_string())).await;

        auth.refresh_access_token().await.unwrap();
        assert!(auth.session().last_error().await.is_none());
        assert!(!auth.session().is_loading().await);
    }

    #[tokio::test]
    async fn test_refresh_after_logout_discards_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"statut": "succes", "token_acces": "access-2"}))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"statut": "succes"})))
            .mount(&server)
            .await;
        let (auth, store) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();

        let logout = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            auth.logout().await
        };
        let (result, _) = futures::join!(auth.refresh_access_token(), logout);

        assert!(matches!(result, Err(ApiError::AuthenticationExpired(None))));
        assert!(auth.session().access_token().await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_shares_lock_with_pipeline() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/loans/active"))
            .and(header("Authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statut": "erreur", "message": "Token expiré"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/loans/active"))
            .and(header("Authorization", "Bearer access-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"statut": "succes"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"statut": "succes", "token_acces": "access-2"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;
        let (auth, _) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();

        let pipeline = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            auth.api().get::<Acknowledgement>("/loans/active").await
        };
        let (explicit, request) = futures::join!(auth.refresh_access_token(), pipeline);

        assert_eq!(explicit.unwrap(), "access-2");
        assert!(request.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejected_ends_session() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statut": "erreur", "message": "Token expiré"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"statut": "succes"})))
            .mount(&server)
            .await;
        let (auth, store) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();

        assert!(auth.refresh_access_token().await.is_err());
        assert!(!auth.session().is_authenticated().await);
        assert!(auth.session().refresh_token().await.is_none());
        assert!(store.is_empty());
        assert_eq!(auth.session().last_error().await.as_deref(), Some("Token expiré"));
    }

    #[tokio::test]
    async fn test_refresh_without_token_ends_session() {
        let server = MockServer::start().await;
        let (auth, _) = manager(&server);

        let result = auth.refresh_access_token().await;
        assert!(matches!(result, Err(ApiError::AuthenticationExpired(None))));
        assert!(!auth.session().is_authenticated().await);
        assert_eq!(auth.session().last_error().await.as_deref(), Some(REFRESH_FAILED));
    }

    #[tokio::test]
    async fn test_change_password_sends_access_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/change-password"))
            .and(header("Authorization", "Bearer access-1"))
            .and(body_json(json!({
                "mot_de_passe_actuel": "p", "nouveau_mot_de_passe": "better-secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statut": "succes", "message": "Mot de passe changé avec succès"
            })))
            .expect(1)
            .mount(&server)
            .await;
        let (auth, _) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();

        let change = PasswordChange {
            current_password: "p".into(),
            new_password: "better-secret".into(),
        };
        auth.change_password(&change).await.unwrap();
        assert!(auth.session().last_error().await.is_none());
    }

    #[tokio::test]
    async fn test_change_password_failure_records_message() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/change-password"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statut": "erreur", "message": "Mot de passe actuel incorrect"
            })))
            .mount(&server)
            .await;
        let (auth, _) = manager(&server);
        auth.login(&credentials(), None).await.unwrap();

        let change = PasswordChange {
            current_password: "wrong".into(),
            new_password: "better-secret".into(),
        };
        assert!(auth.change_password(&change).await.is_err());
        assert_eq!(
            auth.session().last_error().await.as_deref(),
            Some("Mot de passe actuel incorrect")
        );
        // A rejected password change does not end the session
        assert!(auth.session().is_authenticated().await);
    }
}
