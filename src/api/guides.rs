//! Guides admin endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::forms::GuideDraft;
use crate::models::Guide;
use crate::query;
use crate::render::{self, EntryRow};
use crate::AppState;

/// Query string accepted by the guides list views.
#[derive(Debug, Default, Deserialize)]
pub struct GuideListParams {
    #[serde(default)]
    pub query: Option<String>,
}

/// GET /api/admin/guides - filtered admin table rows.
pub async fn list_guides(
    State(state): State<AppState>,
    Query(params): Query<GuideListParams>,
) -> ApiResult<Vec<EntryRow>> {
    let revision_id = state.workspace.revision();
    let records = state.workspace.guides.list().await;
    let view = query::filter_guides(&records, params.query.as_deref().unwrap_or_default());
    success(render::guide_rows(&view), revision_id)
}

/// POST /api/admin/guides - create a guide from form fields.
pub async fn create_guide(
    State(state): State<AppState>,
    Json(draft): Json<GuideDraft>,
) -> ApiResult<Guide> {
    let revision_id = state.workspace.revision();

    match draft.into_record() {
        Ok(record) => {
            let created = state.workspace.guides.create(record).await;
            success(created, state.workspace.revision())
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/guides/{id}/form - load a guide into form fields.
pub async fn guide_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<GuideDraft> {
    let revision_id = state.workspace.revision();

    match state.workspace.guides.get(id).await {
        Some(guide) => success(GuideDraft::from_record(&guide), revision_id),
        None => error(
            AppError::NotFound(format!("Guide {} not found", id)),
            revision_id,
        ),
    }
}

/// PUT /api/admin/guides/{id} - update a guide.
///
/// A missing id is a silent no-op; the form contract still reports success.
pub async fn update_guide(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<GuideDraft>,
) -> ApiResult<Guide> {
    let revision_id = state.workspace.revision();

    match draft.into_record() {
        Ok(mut record) => match state.workspace.guides.update(id, record.clone()).await {
            Some(updated) => success(updated, state.workspace.revision()),
            None => {
                record.id = id;
                success(record, revision_id)
            }
        },
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/guides/{id} - delete a guide.
pub async fn delete_guide(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.workspace.guides.delete(id).await;
    success((), state.workspace.revision())
}
