//! Configuration settings for Inventario
//!
//! Every option is a CLI flag with an environment-variable fallback, so the
//! service runs unchanged under a process manager or a container.

use crate::error::{InventoryError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Placeholder admin token shipped as the default; leaves uploads open
pub const PLACEHOLDER_ADMIN_TOKEN: &str = "changeme";

/// Page served at `/` when the configured index file cannot be read
pub const FALLBACK_INDEX_HTML: &str =
    "<!doctype html><html><body><h2>Servidor en línea</h2><p>Sube index.html</p></body></html>";

/// Inventario - inventory dashboard backend
#[derive(Parser, Debug, Clone)]
#[command(name = "inventario")]
#[command(author = "Inventario Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve delegation inventory aggregates from an uploaded spreadsheet")]
#[command(long_about = r#"
Inventario keeps one inventory spreadsheet in memory and serves filtered
aggregates over it.

Endpoints:
  GET  /delegaciones            Sorted list of delegations
  GET  /estado?delegacion=      Status counts
  GET  /ubicacion?delegacion=   Counts per location
  GET  /destino?delegacion=     Counts per shipping destination
  POST /subir                   Replace the dataset (multipart field "archivo")
  GET  /descargar?delegacion=   Download the dataset as xlsx
  GET  /                        Dashboard page

Examples:
  inventario                                   # Defaults, port 8080
  ADMIN_TOKEN=s3cret inventario --port 9000    # Protected uploads
"#)]
pub struct ServerArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080", value_name = "PORT")]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0", value_name = "ADDR")]
    pub bind: String,

    /// Maximum upload size in megabytes
    #[arg(long, env = "MAX_FILE_MB", default_value = "20", value_name = "MB")]
    pub max_file_mb: usize,

    /// Bearer token required by uploads ("changeme" or empty disables the check)
    #[arg(
        long,
        env = "ADMIN_TOKEN",
        default_value = PLACEHOLDER_ADMIN_TOKEN,
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub admin_token: String,

    /// Allowed CORS origins, comma separated, or "*"
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*", value_name = "ORIGINS")]
    pub allowed_origins: String,

    /// Workbook loaded while no data has been uploaded
    #[arg(
        long,
        env = "DEFAULT_DATA_PATH",
        default_value = "data/inventario.xlsx",
        value_name = "PATH"
    )]
    pub default_data_path: PathBuf,

    /// HTML page served at "/"
    #[arg(long, env = "INDEX_PATH", default_value = "index.html", value_name = "PATH")]
    pub index_path: PathBuf,
}

/// Cross-origin policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin
    AllowAll,
    /// Only the listed origins
    Origins(Vec<String>),
}

impl CorsPolicy {
    /// Parse a comma-separated origin list; `*` or nothing means any origin
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsPolicy::AllowAll
        } else {
            CorsPolicy::Origins(origins)
        }
    }
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// Listen port
    pub port: u16,
    /// Upload cap in bytes
    pub max_body_bytes: usize,
    /// Configured admin token, if any
    pub admin_token: Option<String>,
    /// CORS policy
    pub cors: CorsPolicy,
    /// Workbook loaded while the store is empty
    pub default_data_path: PathBuf,
    /// Dashboard page path
    pub index_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 20 * 1024 * 1024, // 20 MB
            admin_token: Some(PLACEHOLDER_ADMIN_TOKEN.to_string()),
            cors: CorsPolicy::AllowAll,
            default_data_path: PathBuf::from("data/inventario.xlsx"),
            index_path: PathBuf::from("index.html"),
        }
    }
}

impl ServerConfig {
    /// Build configuration from parsed arguments
    pub fn from_args(args: &ServerArgs) -> Result<Self> {
        if args.max_file_mb == 0 {
            return Err(InventoryError::config("MAX_FILE_MB must be greater than zero"));
        }

        let max_body_bytes = args
            .max_file_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| InventoryError::config("MAX_FILE_MB is too large"))?;

        // Blank means unset; otherwise the token is matched exactly as given
        let token = &args.admin_token;

        Ok(Self {
            bind: args.bind.clone(),
            port: args.port,
            max_body_bytes,
            admin_token: (!token.trim().is_empty()).then(|| token.clone()),
            cors: CorsPolicy::parse(&args.allowed_origins),
            default_data_path: args.default_data_path.clone(),
            index_path: args.index_path.clone(),
        })
    }

    /// `host:port` to listen on
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Read the dashboard page once, falling back to a placeholder
    pub fn load_index_html(&self) -> String {
        match std::fs::read_to_string(&self.index_path) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    path = %self.index_path.display(),
                    error = %e,
                    "Index page not readable; serving placeholder"
                );
                FALLBACK_INDEX_HTML.to_string()
            }
        }
    }
}
