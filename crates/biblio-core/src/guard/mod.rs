//! Navigation guard.
//!
//! Before every navigation the target route's requirements are checked
//! against the session's `AuthState`:
//!
//! 1. auth required, not logged in: go to login, remembering the target
//! 2. auth and admin required, not an admin: go home
//! 3. guest-only, logged in: go home
//! 4. otherwise: allow
//!
//! `evaluate` is the pure decision; `RouteGuard` pairs it with the route
//! table and the page title.

pub mod routes;

pub use routes::{document_title, Route, RouteRequirement, RouteTable};

use reqwest::Url;

use crate::auth::AuthState;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Query parameter carrying the originally requested path
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send to the login page; `redirect` is where to go after logging in
    RedirectToLogin { redirect: String },
    RedirectToHome,
}

impl GuardDecision {
    /// Location to navigate to instead, or `None` when allowed.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToHome => Some(HOME_PATH.to_string()),
            GuardDecision::RedirectToLogin { redirect } => Some(login_location(redirect)),
        }
    }
}

/// `/login?redirect=<target>` with the target query-encoded.
pub fn login_location(redirect: &str) -> String {
    // Any absolute base works; only the path and query are kept
    let Ok(mut url) = Url::parse("http://localhost/login") else {
        return LOGIN_PATH.to_string();
    };
    url.query_pairs_mut().append_pair(REDIRECT_PARAM, redirect);
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Decide whether navigating to `target` may proceed.
pub fn evaluate(requirement: &RouteRequirement, state: AuthState, target: &str) -> GuardDecision {
    if requirement.requires_auth {
        if !state.authenticated {
            return GuardDecision::RedirectToLogin {
                redirect: target.to_string(),
            };
        }
        if requirement.requires_admin && !state.admin {
            return GuardDecision::RedirectToHome;
        }
        return GuardDecision::Allow;
    }

    if requirement.guest_only && state.authenticated {
        return GuardDecision::RedirectToHome;
    }

    GuardDecision::Allow
}

/// Result of checking a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub decision: GuardDecision,
    /// Title for the target page
    pub title: String,
}

/// Route table plus guard evaluation.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Check a navigation to `target` (path, optionally with a query).
    ///
    /// Unknown paths carry no requirements.
    pub fn check(&self, target: &str, state: AuthState) -> Navigation {
        let route = self.table.resolve(target);
        let requirement = route.map(|r| r.requirement).unwrap_or_default();

        Navigation {
            decision: evaluate(&requirement, state, target),
            title: document_title(route),
        }
    }
}
