use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "cree_le", default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "nombre_livres", default)]
    pub book_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
