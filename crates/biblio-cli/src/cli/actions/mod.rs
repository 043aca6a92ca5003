pub mod account;
pub mod catalog;
pub mod loans;
pub mod route;
pub mod users;

// Internal "interpreter" for `Action`; the match lives in `run`.
mod run;

use crate::cli::globals::GlobalArgs;

/// A parsed invocation: shared options plus the subcommand to run.
#[derive(Debug)]
pub struct Action {
    pub globals: GlobalArgs,
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Login {
        email: Option<String>,
    },
    Register {
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
    },
    Logout,
    Whoami,
    Passwd,
    Books {
        search: Option<String>,
        page: u32,
    },
    Book {
        id: i64,
    },
    Loans {
        history: bool,
        all: bool,
        page: u32,
    },
    Borrow {
        book_id: i64,
        days: Option<u32>,
    },
    Return {
        loan_id: i64,
    },
    Users {
        page: u32,
    },
    Categories {
        page: u32,
    },
    Route {
        path: String,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

use biblio_core::stores::StoreStatus;
use biblio_core::ApiError;

/// The message a store recorded for its last failure.
fn store_failure(status: &StoreStatus, error: ApiError) -> anyhow::Error {
    anyhow::anyhow!(status
        .last_error
        .clone()
        .unwrap_or_else(|| error.to_string()))
}

/// Fit `text` into `width` columns, marking the cut with an ellipsis.
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}
