//! Account records and the payloads of the auth endpoints.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// A library account as returned by the API.
///
/// Only `is_admin` carries meaning for access control; the remaining
/// fields are displayed and otherwise treated as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "prenom", default)]
    pub first_name: String,
    #[serde(rename = "nom", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "est_admin", default)]
    pub is_admin: bool,
    #[serde(rename = "est_actif", default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "cree_le", default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "derniere_connexion", default)]
    pub last_login: Option<NaiveDateTime>,
}

fn default_true() -> bool {
    true
}

/// Ids arrive as integers from the server but are kept as strings so the
/// record stays opaque to the client.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

impl User {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Merge a partial profile record into this one.
    ///
    /// Fields present in `patch` win; everything else is kept.
    pub fn merged_with(&self, patch: &serde_json::Value) -> Result<User, serde_json::Error> {
        let mut base = serde_json::to_value(self)?;
        if let (Some(base_map), Some(patch_map)) = (base.as_object_mut(), patch.as_object()) {
            for (key, value) in patch_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "mot_de_passe")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "mot_de_passe")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    #[serde(rename = "mot_de_passe_actuel")]
    pub current_password: String,
    #[serde(rename = "nouveau_mot_de_passe")]
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "prenom", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "nom", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "mot_de_passe", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
