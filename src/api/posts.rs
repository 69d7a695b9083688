//! Blog admin endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::forms::PostDraft;
use crate::models::BlogPost;
use crate::query::{self, PostQuery, PostSort};
use crate::render::{self, EntryRow};
use crate::AppState;

/// Query string accepted by the blog list views.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl PostListParams {
    pub(crate) fn to_query(&self) -> PostQuery {
        PostQuery {
            query: self.query.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_else(|| "all".to_string()),
            sort: PostSort::parse(self.sort.as_deref().unwrap_or_default()),
        }
    }
}

/// GET /api/admin/blog - filtered, ordered admin table rows.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> ApiResult<Vec<EntryRow>> {
    let revision_id = state.workspace.revision();
    let records = state.workspace.blog.list().await;
    let view = query::filter_posts(&records, &params.to_query());
    success(render::post_rows(&view), revision_id)
}

/// POST /api/admin/blog - create a post from form fields.
pub async fn create_post(
    State(state): State<AppState>,
    Json(draft): Json<PostDraft>,
) -> ApiResult<BlogPost> {
    let revision_id = state.workspace.revision();

    match draft.into_record() {
        Ok(record) => {
            let created = state.workspace.blog.create(record).await;
            success(created, state.workspace.revision())
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/blog/{id}/form - load a post into form fields.
pub async fn post_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PostDraft> {
    let revision_id = state.workspace.revision();

    match state.workspace.blog.get(id).await {
        Some(post) => success(PostDraft::from_record(&post), revision_id),
        None => error(
            AppError::NotFound(format!("Post {} not found", id)),
            revision_id,
        ),
    }
}

/// PUT /api/admin/blog/{id} - update a post.
///
/// A missing id is a silent no-op; the form contract still reports success.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<PostDraft>,
) -> ApiResult<BlogPost> {
    let revision_id = state.workspace.revision();

    match draft.into_record() {
        Ok(mut record) => match state.workspace.blog.update(id, record.clone()).await {
            Some(updated) => success(updated, state.workspace.revision()),
            None => {
                record.id = id;
                success(record, revision_id)
            }
        },
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/blog/{id} - delete a post.
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.workspace.blog.delete(id).await;
    success((), state.workspace.revision())
}
