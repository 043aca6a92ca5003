//! REST API client module for the library server.
//!
//! This module provides the `ApiClient` request pipeline, the pure
//! `decorate`/`classify` halves it is built from, and the `ApiError`
//! taxonomy every data operation reports.
//!
//! The server issues opaque bearer tokens at login: a short-lived access
//! token sent with every request, and a refresh token used only to mint a
//! new access token when the old one is rejected.

pub mod client;
pub mod error;
pub mod pipeline;

pub use client::{Acknowledgement, ApiClient, NavigationEvent};
pub use error::{extract_message, ApiError};
pub use pipeline::{classify, decorate, ApiRequest, Outcome};
