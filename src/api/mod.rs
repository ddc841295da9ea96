//! Inventario HTTP API
//!
//! REST endpoints over the in-memory inventory table.
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/` | GET | Dashboard page |
//! | `/health` | GET | Liveness probe |
//! | `/delegaciones` | GET | Sorted delegations present in the data |
//! | `/estado` | GET | Counts per tracked status, excluding items in transit |
//! | `/ubicacion` | GET | Counts per uppercased location, excluding items in transit |
//! | `/destino` | GET | Counts per shipping destination |
//! | `/subir` | POST | Replace the dataset (multipart `archivo`, bearer token) |
//! | `/descargar` | GET | Download the dataset as xlsx |
//!
//! Every read endpoint accepts `?delegacion=<name>` to narrow the rows.

mod auth;
mod handlers;
mod models;
mod server;

pub use auth::*;
pub use handlers::*;
pub use models::*;
pub use server::*;
