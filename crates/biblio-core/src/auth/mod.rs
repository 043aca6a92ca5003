//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `Session` / `SessionHandle`: the in-memory session, written through to
//!   a persistent `KeyValueStore` on every change
//! - `AuthManager`: login, register, logout, refresh and password change
//!
//! The access token is present exactly when a user is present.

pub mod manager;
pub mod session;

pub use manager::AuthManager;
pub use session::{AuthState, Session, SessionHandle};
