//! Request decoration and response classification.
//!
//! These are the two pure halves of the request pipeline. `ApiClient`
//! composes them around the transport call: decorate, send, classify,
//! and on an authentication failure refresh and go around once more.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use super::ApiError;

/// A logical API request.
///
/// The `retried` flag belongs to the request instance and is set the first
/// time an authentication failure is recovered from, so each request is
/// retried at most once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::RequestMalformed(format!("Failed to encode body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Mark the request as retried. Idempotent.
    pub fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// The bearer token currently attached, if any
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

/// Attach `Authorization: Bearer <token>` when a token is present.
///
/// Nothing else about the request is touched.
pub fn decorate(mut request: ApiRequest, access_token: Option<&str>) -> Result<ApiRequest, ApiError> {
    if let Some(token) = access_token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::RequestMalformed("Access token is not a valid header value".into()))?;
        request.headers.insert(AUTHORIZATION, value);
    }
    Ok(request)
}

/// What a response status means to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// 401: the access token was rejected
    FailedAuth,
    /// 403: authenticated but not allowed
    Forbidden,
    FailedOther,
}

pub fn classify(status: StatusCode) -> Outcome {
    match status.as_u16() {
        200..=399 => Outcome::Succeeded,
        401 => Outcome::FailedAuth,
        403 => Outcome::Forbidden,
        _ => Outcome::FailedOther,
    }
}
