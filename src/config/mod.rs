//! Configuration module for Inventario
//!
//! Provides CLI arguments with environment fallbacks and the resolved
//! runtime settings.

mod settings;

pub use settings::*;
