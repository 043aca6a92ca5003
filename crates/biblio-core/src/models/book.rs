use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Book {
    pub id: i64,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "auteur")]
    pub author: String,
    pub isbn: String,
    #[serde(rename = "date_publication", default)]
    pub published_on: Option<NaiveDate>,
    #[serde(rename = "quantite", default)]
    pub quantity: i32,
    #[serde(rename = "disponible", default)]
    pub available: i32,
    #[serde(rename = "cree_le", default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available > 0
    }

    pub fn availability_display(&self) -> String {
        format!("{}/{} available", self.available.max(0), self.quantity)
    }
}

/// Payload for creating a catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct BookInput {
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "auteur")]
    pub author: String,
    pub isbn: String,
    #[serde(rename = "date_publication", skip_serializing_if = "Option::is_none")]
    pub published_on: Option<NaiveDate>,
    #[serde(rename = "quantite", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

/// Partial update; unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookUpdate {
    #[serde(rename = "titre", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "auteur", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(rename = "date_publication", skip_serializing_if = "Option::is_none")]
    pub published_on: Option<NaiveDate>,
    #[serde(rename = "quantite", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_book() {
        let book: Book = serde_json::from_value(json!({
            "id": 3,
            "titre": "Les Misérables",
            "auteur": "Victor Hugo",
            "isbn": "9782070409228",
            "date_publication": "1862-04-03",
            "quantite": 4,
            "disponible": 0,
            "cree_le": "2024-01-02T08:00:00"
        }))
        .expect("Failed to parse book");

        assert_eq!(book.author, "Victor Hugo");
        assert_eq!(book.published_on, NaiveDate::from_ymd_opt(1862, 4, 3));
        assert!(!book.is_available());
        assert_eq!(book.availability_display(), "0/4 available");
    }
}
