use serde::{Deserialize, Serialize};

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Pagination {
    pub page: u32,
    #[serde(rename = "par_page")]
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
    #[serde(rename = "a_suivant")]
    pub has_next: bool,
    #[serde(rename = "a_precedent")]
    pub has_previous: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            total: 0,
            pages: 0,
            has_next: false,
            has_previous: false,
        }
    }
}

impl Pagination {
    /// Short "page X of Y" label for list footers.
    pub fn display(&self) -> String {
        format!("page {} of {} ({} total)", self.page, self.pages.max(1), self.total)
    }
}
