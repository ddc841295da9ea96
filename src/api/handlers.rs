//! API Request Handlers
//!
//! HTTP request handlers for all API endpoints.

use crate::api::auth::AuthPolicy;
use crate::api::models::*;
use crate::error::{InventoryError, Result};
use crate::policy::apply_allow_list;
use crate::query::{self, Counts, StatusCounts};
use crate::sheet::{read_table, write_table, XLSX_CONTENT_TYPE};
use crate::store::DatasetStore;
use crate::table::Table;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

/// Multipart field carrying the uploaded workbook
pub const UPLOAD_FIELD: &str = "archivo";

/// Message returned after a successful upload
pub const UPLOAD_OK_MESSAGE: &str = "Archivo cargado correctamente";

/// Application state shared across handlers
pub struct AppState {
    /// The inventory table
    pub store: DatasetStore,
    /// Upload authorization
    pub auth: AuthPolicy,
    /// Dashboard page, read once at startup
    pub index_html: String,
    /// Upload cap in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: DatasetStore,
        auth: AuthPolicy,
        index_html: String,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            store,
            auth,
            index_html,
            max_body_bytes,
        }
    }

}

/// Shared state handle used by the router
pub type SharedState = Arc<AppState>;

/// Run `f` on the blocking pool, off the async workers
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Load the default dataset if needed, then run `f` under the lock
async fn with_table<T, F>(state: &SharedState, f: F) -> Result<T>
where
    F: FnOnce(&Table) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    blocking(move || {
        state.store.ensure_loaded();
        state.store.read(f)
    })
    .await
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        match self {
            InventoryError::Unauthorized => status.into_response(),
            other => (status, Json(ErrorBody { error: other.to_string() })).into_response(),
        }
    }
}

/// Handler for GET /delegaciones
pub async fn handle_delegations(
    State(state): State<SharedState>,
    Query(params): Query<DelegationQuery>,
) -> Result<Json<Vec<String>>> {
    with_table(&state, move |table| query::list_delegations(table, params.delegation()))
        .await
        .map(Json)
}

/// Handler for GET /estado
pub async fn handle_status_counts(
    State(state): State<SharedState>,
    Query(params): Query<DelegationQuery>,
) -> Result<Json<StatusCounts>> {
    with_table(&state, move |table| query::status_counts(table, params.delegation()))
        .await
        .map(Json)
}

/// Handler for GET /ubicacion
pub async fn handle_location_counts(
    State(state): State<SharedState>,
    Query(params): Query<DelegationQuery>,
) -> Result<Json<Counts>> {
    with_table(&state, move |table| query::location_counts(table, params.delegation()))
        .await
        .map(Json)
}

/// Handler for GET /destino
pub async fn handle_destination_counts(
    State(state): State<SharedState>,
    Query(params): Query<DelegationQuery>,
) -> Result<Json<Counts>> {
    with_table(&state, move |table| query::destination_counts(table, params.delegation()))
        .await
        .map(Json)
}

/// Handler for POST /subir
pub async fn handle_upload(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageBody>> {
    if let Err(e) = state.auth.authorize(&headers) {
        tracing::warn!("Rejected upload with missing or invalid token");
        return Err(e);
    }

    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload is not a multipart request");
        InventoryError::MissingUpload
    })?;

    let bytes = read_upload(&mut multipart, state.max_body_bytes).await?;
    let size = bytes.len();

    let rows = blocking(move || {
        let table = apply_allow_list(read_table(bytes)?)?;
        Ok(state.store.replace(table))
    })
    .await?;
    tracing::info!(bytes = size, rows, "Dataset replaced from upload");

    Ok(Json(MessageBody {
        mensaje: UPLOAD_OK_MESSAGE.to_string(),
    }))
}

/// Handler for GET /descargar
pub async fn handle_download(
    State(state): State<SharedState>,
    Query(params): Query<DelegationQuery>,
) -> Result<Response> {
    let disposition = format!(
        "attachment; filename=\"datos_inventario_{}.xlsx\"",
        params.slug()
    );
    let bytes = with_table(&state, move |table| {
        if table.is_empty() {
            return Err(InventoryError::NoData);
        }
        write_table(&table.for_delegation(params.delegation()))
    })
    .await?;

    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| InventoryError::Export(format!("invalid download name: {}", e)))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Handler for GET /
pub async fn handle_index(State(state): State<SharedState>) -> Html<String> {
    Html(state.index_html.clone())
}

/// Handler for GET /health
pub async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rows: state.store.len(),
    })
}

/// Pull the bytes of the `archivo` part out of a multipart body
async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // A part without a file name is a plain form value, not an upload
        if !field.file_name().is_some_and(|name| !name.is_empty()) {
            return Err(InventoryError::MissingUpload);
        }
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        return Ok(bytes.to_vec());
    }

    Err(InventoryError::MissingUpload)
}

fn multipart_error(err: MultipartError, limit: usize) -> InventoryError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(limit, "Rejected upload over the size limit");
        InventoryError::PayloadTooLarge { limit }
    } else {
        tracing::debug!(error = %err.body_text(), "Malformed multipart body");
        InventoryError::MissingUpload
    }
}
