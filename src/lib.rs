//! # Inventario - Delegation Inventory Dashboard Backend
//!
//! Inventario keeps one inventory spreadsheet in memory and answers
//! aggregate questions about it over HTTP. Rows belong to regional
//! delegations; only a fixed allow-list of delegations is ever kept.
//!
//! ## Features
//!
//! - **Spreadsheet ingestion**: xlsx, xlsm, xlsb, xls and ods uploads
//! - **Delegation allow-list**: unknown delegations are dropped on ingest
//! - **Aggregates**: status, location and destination counts per delegation
//! - **Export**: download the current (optionally filtered) data as xlsx
//! - **Lazy default dataset**: loaded from disk the first time it is needed
//!
//! ## Quick Start
//!
//! ```no_run
//! use inventario::config::ServerConfig;
//! use inventario::api::ApiServer;
//!
//! # async fn run() -> inventario::Result<()> {
//! let server = ApiServer::new(ServerConfig::default());
//! server.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Querying Without HTTP
//!
//! ```
//! use inventario::table::{Table, COL_DELEGATION, COL_STATUS};
//! use inventario::{policy, query};
//!
//! let table = Table::from_text_rows(
//!     &[COL_DELEGATION, COL_STATUS],
//!     &[&[" PUNO", "Nuevo"], &["ELSEWHERE", "Nuevo"]],
//! );
//! let table = policy::apply_allow_list(table).unwrap();
//!
//! assert_eq!(query::list_delegations(&table, None).unwrap(), vec!["PUNO"]);
//! assert_eq!(query::status_counts(&table, Some("PUNO")).unwrap().new, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod policy;
pub mod query;
pub mod sheet;
pub mod store;
pub mod table;

// Re-export commonly used types
pub use config::{ServerArgs, ServerConfig};
pub use error::{InventoryError, Result};
pub use store::DatasetStore;
pub use table::{CellValue, Table};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
