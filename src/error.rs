//! Error types for Inventario
//!
//! Every failure a request can hit maps to one variant here; the API layer
//! turns a variant into a status code and a `{"error": ...}` body.

use std::path::PathBuf;
use thiserror::Error;

/// Message returned by every read endpoint while the table is empty
pub const NO_DATA_MESSAGE: &str = "No hay datos cargados aún.";

/// Main error type for Inventario operations
#[derive(Error, Debug)]
pub enum InventoryError {
    /// No rows are loaded
    #[error("No hay datos cargados aún.")]
    NoData,

    /// Uploaded sheet lacks a required column
    #[error("El archivo no contiene la columna '{0}'.")]
    MissingColumn(String),

    /// The workbook could not be parsed
    #[error("{0}")]
    Spreadsheet(String),

    /// No `archivo` part in the upload
    #[error("No se ha subido ningún archivo")]
    MissingUpload,

    /// Bearer token missing or wrong
    #[error("Unauthorized")]
    Unauthorized,

    /// Upload exceeds the configured cap
    #[error("El archivo excede el tamaño máximo de {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// I/O error with path context
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listener could not bind or the server loop failed
    #[error("Server error on '{addr}': {source}")]
    Server {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),

    /// Workbook serialization failed
    #[error("Export error: {0}")]
    Export(String),
}

impl InventoryError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a server error for a listen address
    pub fn server(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Server {
            addr: addr.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a spreadsheet parse error
    pub fn spreadsheet(message: impl Into<String>) -> Self {
        Self::Spreadsheet(message.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoData
            | Self::MissingColumn(_)
            | Self::Spreadsheet(_)
            | Self::MissingUpload => 400,
            Self::Unauthorized => 401,
            Self::PayloadTooLarge { .. } => 413,
            Self::Io { .. }
            | Self::Server { .. }
            | Self::Config(_)
            | Self::Task(_)
            | Self::Export(_) => 500,
        }
    }

    /// Whether the error is the caller's fault
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for Inventario operations
pub type Result<T> = std::result::Result<T, InventoryError>;

impl From<calamine::Error> for InventoryError {
    fn from(err: calamine::Error) -> Self {
        InventoryError::Spreadsheet(err.to_string())
    }
}

impl From<tokio::task::JoinError> for InventoryError {
    fn from(err: tokio::task::JoinError) -> Self {
        InventoryError::Task(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for InventoryError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        InventoryError::Export(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| InventoryError::io(path, e))
    }
}
