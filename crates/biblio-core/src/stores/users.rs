use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{replace_by, StoreStatus};
use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::models::{Pagination, ProfileUpdate, User};

const PROFILE_FAILED: &str = "An error occurred while loading the profile";
const PROFILE_UPDATE_FAILED: &str = "An error occurred while updating the profile";
const USERS_FAILED: &str = "An error occurred while loading users";
const ROLE_FAILED: &str = "An error occurred while updating the role";
const STATUS_FAILED: &str = "An error occurred while updating the status";

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(rename = "utilisateurs", default)]
    users: Vec<User>,
    #[serde(default)]
    pagination: Pagination,
}

/// Raw user payload, kept as JSON so a partial record can be merged.
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[serde(rename = "utilisateur")]
    user: serde_json::Value,
}

impl UserEnvelope {
    fn into_user(self) -> Result<User, ApiError> {
        serde_json::from_value(self.user)
            .map_err(|e| ApiError::InvalidResponse(format!("Unexpected user record: {}", e)))
    }
}

/// The current user's profile, plus account administration.
pub struct UserStore {
    api: ApiClient,
    pub profile: Option<User>,
    /// All accounts; admin only
    pub users: Vec<User>,
    pub pagination: Pagination,
    pub status: StoreStatus,
}

impl UserStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            profile: None,
            users: Vec::new(),
            pagination: Pagination::default(),
            status: StoreStatus::default(),
        }
    }

    pub async fn fetch_profile(&mut self) {
        self.status.begin();
        let result = match self.api.get::<UserEnvelope>("/users/profile").await {
            Ok(envelope) => envelope.into_user(),
            Err(e) => Err(e),
        };
        if let Ok(user) = self.status.finish(result, PROFILE_FAILED) {
            self.profile = Some(user);
        }
    }

    /// Update the profile and fold the result into the session's user.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.status.begin();
        let result = self.send_profile_update(update).await;
        self.status.finish(result, PROFILE_UPDATE_FAILED)
    }

    async fn send_profile_update(&mut self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.api.put("/users/profile", update).await?;

        let session = self.api.session();
        if let Some(current) = session.user().await {
            match current.merged_with(&envelope.user) {
                Ok(merged) => {
                    session.update_user(merged).await?;
                }
                Err(e) => warn!(error = %e, "Could not merge updated profile into session"),
            }
        }

        let user = envelope.into_user()?;
        self.profile = Some(user.clone());
        Ok(user)
    }

    pub async fn fetch_users(&mut self, page: u32, per_page: u32) {
        self.status.begin();
        let request = ApiRequest::get("/users")
            .query("page", page)
            .query("par_page", per_page);
        let result = self.api.send::<UserPage>(request).await;
        if let Ok(page) = self.status.finish(result, USERS_FAILED) {
            self.users = page.users;
            self.pagination = page.pagination;
        }
    }

    pub async fn update_role(&mut self, user_id: &str, is_admin: bool) -> Result<User, ApiError> {
        self.status.begin();
        let result = self
            .update_account(&format!("/users/{}/role", user_id), json!({ "est_admin": is_admin }))
            .await;
        self.status.finish(result, ROLE_FAILED)
    }

    pub async fn update_status(&mut self, user_id: &str, is_active: bool) -> Result<User, ApiError> {
        self.status.begin();
        let result = self
            .update_account(&format!("/users/{}/status", user_id), json!({ "est_actif": is_active }))
            .await;
        self.status.finish(result, STATUS_FAILED)
    }

    async fn update_account(&mut self, path: &str, body: serde_json::Value) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.api.put(path, &body).await?;
        let user = envelope.into_user()?;
        replace_by(&mut self.users, &user, |a, b| a.id == b.id);
        Ok(user)
    }
}
