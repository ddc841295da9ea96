//! Upload authorization
//!
//! A single shared bearer token guards `POST /subir`. Leaving the token unset
//! or at its placeholder value opens uploads to anyone; that mode exists for
//! demos and local use and is announced with a warning at startup. Setting a
//! real `ADMIN_TOKEN` is a deployment responsibility.

use crate::config::PLACEHOLDER_ADMIN_TOKEN;
use crate::error::{InventoryError, Result};
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// How uploads are authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    /// No token configured: every request is authorized
    Open,
    /// Requests must carry `Authorization: Bearer <token>`
    Bearer(String),
}

impl AuthPolicy {
    /// Resolve the policy from the configured token
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            None | Some("") | Some(PLACEHOLDER_ADMIN_TOKEN) => AuthPolicy::Open,
            Some(token) => AuthPolicy::Bearer(token.to_string()),
        }
    }

    /// Whether uploads are unprotected
    pub fn is_open(&self) -> bool {
        matches!(self, AuthPolicy::Open)
    }

    /// Check the request headers
    pub fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let AuthPolicy::Bearer(token) = self else {
            return Ok(());
        };

        let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        match presented.and_then(|v| v.strip_prefix("Bearer ")) {
            Some(candidate) if candidate == token => Ok(()),
            _ => Err(InventoryError::Unauthorized),
        }
    }
}
