//! Resource stores: cached copies of server collections.
//!
//! Each store holds the last fetched page of its collection, the selected
//! record, pagination, and a `StoreStatus`. All traffic goes through the
//! authenticated `ApiClient` pipeline.
//!
//! List fetches record a failure in `status.last_error` and keep the
//! previous data; mutations record it and return it.

pub mod books;
pub mod categories;
pub mod loans;
pub mod users;

pub use books::BookStore;
pub use categories::CategoryStore;
pub use loans::LoanStore;
pub use users::UserStore;

use crate::api::{extract_message, ApiError};

/// Default page size for list endpoints
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub loading: bool,
    pub last_error: Option<String>,
}

impl StoreStatus {
    fn begin(&mut self) {
        self.loading = true;
        self.last_error = None;
    }

    fn finish<T>(&mut self, result: Result<T, ApiError>, default_message: &str) -> Result<T, ApiError> {
        self.loading = false;
        if let Err(ref e) = result {
            self.last_error = Some(extract_message(e, default_message));
        }
        result
    }
}

/// Replace the record with a matching id, if present.
fn replace_by<T>(items: &mut [T], updated: &T, same: impl Fn(&T, &T) -> bool)
where
    T: Clone,
{
    if let Some(slot) = items.iter_mut().find(|item| same(&**item, updated)) {
        *slot = updated.clone();
    }
}
