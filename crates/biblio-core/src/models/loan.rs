use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Loan {
    pub id: i64,
    #[serde(rename = "utilisateur_id")]
    pub user_id: i64,
    #[serde(rename = "livre_id")]
    pub book_id: i64,
    #[serde(rename = "date_emprunt", default)]
    pub borrowed_at: Option<NaiveDateTime>,
    #[serde(rename = "date_retour_prevue", default)]
    pub due_at: Option<NaiveDateTime>,
    #[serde(rename = "date_retour_effective", default)]
    pub returned_at: Option<NaiveDateTime>,
    #[serde(rename = "est_retourne", default)]
    pub is_returned: bool,
    #[serde(rename = "est_en_retard", default)]
    pub is_overdue: bool,
    #[serde(rename = "jours_de_retard", default)]
    pub days_overdue: i64,
}

impl Loan {
    pub fn status_display(&self) -> String {
        if self.is_returned {
            "returned".to_string()
        } else if self.is_overdue {
            format!("overdue by {} day(s)", self.days_overdue)
        } else {
            "on loan".to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanRequest {
    #[serde(rename = "livre_id")]
    pub book_id: i64,
    /// Loan length in days; the server applies its own default when unset.
    #[serde(rename = "duree_emprunt", skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
}
