//! Map parsed command-line matches to the action to run.

use crate::cli::actions::{Action, Task};
use crate::cli::commands::{account, library, ARG_BASE_URL, ARG_SESSION_BACKEND};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use biblio_core::SessionBackend;

/// # Errors
/// Returns an error if the subcommand is unknown or an argument fails to parse.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = GlobalArgs {
        base_url: matches.get_one::<String>(ARG_BASE_URL).cloned(),
        session_backend: matches
            .get_one::<String>(ARG_SESSION_BACKEND)
            .map(|raw| raw.parse::<SessionBackend>())
            .transpose()?,
    };

    let task = match matches.subcommand() {
        Some((account::CMD_LOGIN, sub)) => Task::Login {
            email: sub.get_one::<String>(account::ARG_EMAIL).cloned(),
        },
        Some((account::CMD_REGISTER, sub)) => Task::Register {
            first_name: sub.get_one::<String>(account::ARG_FIRST_NAME).cloned(),
            last_name: sub.get_one::<String>(account::ARG_LAST_NAME).cloned(),
            email: sub.get_one::<String>(account::ARG_EMAIL).cloned(),
        },
        Some((account::CMD_LOGOUT, _)) => Task::Logout,
        Some((account::CMD_WHOAMI, _)) => Task::Whoami,
        Some((account::CMD_PASSWD, _)) => Task::Passwd,
        Some((library::CMD_BOOKS, sub)) => Task::Books {
            search: sub.get_one::<String>(library::ARG_SEARCH).cloned(),
            page: page(sub),
        },
        Some((library::CMD_BOOK, sub)) => Task::Book { id: id(sub)? },
        Some((library::CMD_LOANS, sub)) => Task::Loans {
            history: sub.get_flag(library::ARG_HISTORY),
            all: sub.get_flag(library::ARG_ALL),
            page: page(sub),
        },
        Some((library::CMD_BORROW, sub)) => Task::Borrow {
            book_id: id(sub)?,
            days: sub.get_one::<u32>(library::ARG_DAYS).copied(),
        },
        Some((library::CMD_RETURN, sub)) => Task::Return { loan_id: id(sub)? },
        Some((library::CMD_USERS, sub)) => Task::Users { page: page(sub) },
        Some((library::CMD_CATEGORIES, sub)) => Task::Categories { page: page(sub) },
        Some((library::CMD_ROUTE, sub)) => Task::Route {
            path: sub
                .get_one::<String>(library::ARG_PATH)
                .cloned()
                .context("missing required argument: PATH")?,
        },
        Some((other, _)) => return Err(anyhow!("unknown command: {}", other)),
        None => return Err(anyhow!("no command given")),
    };

    Ok(Action { globals, task })
}

fn page(matches: &clap::ArgMatches) -> u32 {
    matches.get_one::<u32>(library::ARG_PAGE).copied().unwrap_or(1)
}

fn id(matches: &clap::ArgMatches) -> Result<i64> {
    matches
        .get_one::<i64>(library::ARG_ID)
        .copied()
        .context("missing required argument: ID")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    fn dispatch(args: &[&str]) -> Action {
        let matches = commands::new().get_matches_from(args);
        handler(&matches).unwrap()
    }

    #[test]
    fn test_login_email() {
        let action = dispatch(&["biblio", "login", "--email", "ada@example.org"]);
        match action.task {
            Task::Login { email } => assert_eq!(email.as_deref(), Some("ada@example.org")),
            other => panic!("unexpected task: {:?}", other),
        }
    }

    #[test]
    fn test_session_backend_parsed() {
        let action = dispatch(&["biblio", "--session-backend", "keyring", "logout"]);
        assert_eq!(action.globals.session_backend, Some(SessionBackend::Keyring));
        assert!(matches!(action.task, Task::Logout));
    }

    #[test]
    fn test_borrow_with_days() {
        let action = dispatch(&["biblio", "borrow", "42", "--days", "21"]);
        match action.task {
            Task::Borrow { book_id, days } => {
                assert_eq!(book_id, 42);
                assert_eq!(days, Some(21));
            }
            other => panic!("unexpected task: {:?}", other),
        }
    }

    #[test]
    fn test_loans_history() {
        let action = dispatch(&["biblio", "loans", "--history", "--page", "2"]);
        match action.task {
            Task::Loans { history, all, page } => {
                assert!(history);
                assert!(!all);
                assert_eq!(page, 2);
            }
            other => panic!("unexpected task: {:?}", other),
        }
    }

    #[test]
    fn test_route_path() {
        let action = dispatch(&["biblio", "route", "/books/7/edit"]);
        match action.task {
            Task::Route { path } => assert_eq!(path, "/books/7/edit"),
            other => panic!("unexpected task: {:?}", other),
        }
    }
}
