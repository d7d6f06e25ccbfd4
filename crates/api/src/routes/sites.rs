//! Site listing, import and export endpoints.

use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use domain::models::Site;
use domain::models::site::SiteResponse;
use persistence::repositories::SiteRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_import_rows;
use crate::routes::read_upload;
use crate::services::imports;
use crate::services::report_export::timestamped_filename;

#[derive(Debug, Deserialize)]
pub struct SiteListQuery {
    pub cluster: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteListResponse {
    pub sites: Vec<SiteResponse>,
    pub clusters: Vec<String>,
}

/// GET /api/v1/panel/sites
pub async fn list_sites(
    State(state): State<AppState>,
    Query(query): Query<SiteListQuery>,
) -> Result<Json<SiteListResponse>, ApiError> {
    let sites = SiteRepository::new(state.pool.clone());

    let rows = sites.list(query.cluster.as_deref()).await?;
    let clusters = sites.list_clusters().await?;

    Ok(Json(SiteListResponse {
        sites: rows
            .into_iter()
            .map(|e| SiteResponse::from(Site::from(e)))
            .collect(),
        clusters,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteImportResponse {
    pub imported: u64,
}

/// POST /api/v1/panel/sites/import
///
/// Replaces the whole site register with the uploaded CSV. Partial
/// updates are not supported; the asset register is the source of truth.
pub async fn import_sites(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SiteImportResponse>, ApiError> {
    let (file_name, bytes) = read_upload(&mut multipart).await?;

    let rows = imports::parse_site_rows(&bytes)
        .map_err(|e| ApiError::Validation(format!("Invalid site file: {}", e)))?;

    let sites = SiteRepository::new(state.pool.clone());
    let imported = sites.replace_all(&rows).await?;

    record_import_rows("sites", imported as usize);
    tracing::info!(file = %file_name, imported, "Site register replaced");

    Ok(Json(SiteImportResponse { imported }))
}

/// GET /api/v1/panel/sites/export
pub async fn export_sites(State(state): State<AppState>) -> Result<Response, ApiError> {
    let sites = SiteRepository::new(state.pool.clone());
    let rows = sites.list(None).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["global_id", "cluster", "site_name", "latitude", "longitude"])
        .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;
    for site in rows {
        let latitude = site.latitude.map(|v| v.to_string()).unwrap_or_default();
        let longitude = site.longitude.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([
                site.global_id.as_str(),
                site.cluster.as_str(),
                site.site_name.as_str(),
                latitude.as_str(),
                longitude.as_str(),
            ])
            .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;

    let file_name = timestamped_filename("sites", "csv");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
