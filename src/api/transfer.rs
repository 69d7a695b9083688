//! Import/export endpoints for whole collections.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::store::Dataset;
use crate::AppState;

/// Outcome of a completed import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub dataset: Dataset,
    pub imported: usize,
}

/// GET /api/admin/export/{dataset} - download the collection as pretty JSON.
pub async fn export_dataset(
    State(state): State<AppState>,
    Path(dataset): Path<Dataset>,
) -> Response {
    let body = state.workspace.export_json(dataset).await;
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"zemora-{}.json\"", dataset),
            ),
        ],
        body,
    )
        .into_response()
}

/// POST /api/admin/import/{dataset} - replace the collection from a JSON array.
///
/// The whole import aborts on any failure; no partial write occurs.
pub async fn import_dataset(
    State(state): State<AppState>,
    Path(dataset): Path<Dataset>,
    body: String,
) -> ApiResult<ImportSummary> {
    let revision_id = state.workspace.revision();

    match state.workspace.import_json(dataset, &body).await {
        Ok(imported) => success(
            ImportSummary { dataset, imported },
            state.workspace.revision(),
        ),
        Err(e) => error(e, revision_id),
    }
}
