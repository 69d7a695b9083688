//! Tools admin endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::forms::ToolDraft;
use crate::models::Tool;
use crate::query::{self, ToolQuery, ToolSort};
use crate::render::{self, ToolRow};
use crate::AppState;

/// Query string accepted by the tools list views.
#[derive(Debug, Default, Deserialize)]
pub struct ToolListParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl ToolListParams {
    pub(crate) fn to_query(&self) -> ToolQuery {
        ToolQuery {
            query: self.query.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_else(|| "all".to_string()),
            sort: ToolSort::parse(self.sort.as_deref().unwrap_or_default()),
            featured_only: self.featured.unwrap_or(false),
        }
    }
}

/// GET /api/admin/tools - filtered, ordered admin table rows.
pub async fn list_tools(
    State(state): State<AppState>,
    Query(params): Query<ToolListParams>,
) -> ApiResult<Vec<ToolRow>> {
    let revision_id = state.workspace.revision();
    let records = state.workspace.tools.list().await;
    let view = query::filter_tools(&records, &params.to_query());
    success(render::tool_rows(&view), revision_id)
}

/// POST /api/admin/tools - create a tool from form fields.
pub async fn create_tool(
    State(state): State<AppState>,
    Json(draft): Json<ToolDraft>,
) -> ApiResult<Tool> {
    let revision_id = state.workspace.revision();

    match draft.into_record() {
        Ok(record) => {
            let created = state.workspace.tools.create(record).await;
            success(created, state.workspace.revision())
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/tools/{id}/form - load a tool into form fields.
pub async fn tool_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ToolDraft> {
    let revision_id = state.workspace.revision();

    match state.workspace.tools.get(id).await {
        Some(tool) => success(ToolDraft::from_record(&tool), revision_id),
        None => error(
            AppError::NotFound(format!("Tool {} not found", id)),
            revision_id,
        ),
    }
}

/// PUT /api/admin/tools/{id} - update a tool.
///
/// A missing id is a silent no-op; the form contract still reports success.
pub async fn update_tool(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<ToolDraft>,
) -> ApiResult<Tool> {
    let revision_id = state.workspace.revision();

    match draft.into_record() {
        Ok(mut record) => match state.workspace.tools.update(id, record.clone()).await {
            Some(updated) => success(updated, state.workspace.revision()),
            None => {
                record.id = id;
                success(record, revision_id)
            }
        },
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/tools/{id} - delete a tool.
pub async fn delete_tool(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.workspace.tools.delete(id).await;
    success((), state.workspace.revision())
}
