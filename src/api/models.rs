//! API Data Models
//!
//! Request parameters and response bodies for the HTTP endpoints.

use serde::{Deserialize, Serialize};

/// `?delegacion=` filter accepted by the read and download endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DelegationQuery {
    /// Delegation to narrow on; absent or empty means all
    #[serde(default)]
    pub delegacion: Option<String>,
}

impl DelegationQuery {
    /// The filter value, `None` when absent or empty
    pub fn delegation(&self) -> Option<&str> {
        self.delegacion.as_deref().filter(|d| !d.is_empty())
    }

    /// File-name fragment for downloads.
    ///
    /// Spaces become `_`, path separators become `-`, and no filter yields
    /// `todas`. Quotes and control characters are dropped so the name fits
    /// in a `Content-Disposition` header.
    pub fn slug(&self) -> String {
        match self.delegation() {
            Some(name) => name
                .chars()
                .filter(|c| !c.is_control() && *c != '"')
                .collect::<String>()
                .replace(' ', "_")
                .replace(['/', '\\'], "-"),
            None => "todas".to_string(),
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable message
    pub error: String,
}

/// Success body for uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    /// Human readable message
    pub mensaje: String,
}

/// Health probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
    /// Rows currently held
    pub rows: usize,
}
