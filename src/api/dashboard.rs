//! Dashboard endpoints: login, collection stats, force refresh.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::auth;
use crate::errors::AppError;
use crate::AppState;

/// POST /api/login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginOk {
    pub authenticated: bool,
}

/// POST /api/login - check the shared secret.
///
/// Success reveals the dashboard; failure is a visible error with no state
/// change.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginOk> {
    let revision_id = state.workspace.revision();

    if auth::verify_password(request.password.trim(), &state.config.admin_password) {
        success(LoginOk { authenticated: true }, revision_id)
    } else {
        error(
            AppError::Unauthorized("Invalid password".to_string()),
            revision_id,
        )
    }
}

/// Per-collection counts plus the last sync activity line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub tools: usize,
    pub guides: usize,
    pub blog: usize,
    pub sync_status: String,
}

/// GET /api/admin/stats - dashboard counters.
pub async fn stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let revision_id = state.workspace.revision();
    let counts = state.workspace.counts().await;
    success(
        DashboardStats {
            tools: counts.tools,
            guides: counts.guides,
            blog: counts.blog,
            sync_status: state.workspace.sync_status(),
        },
        revision_id,
    )
}

/// POST /api/admin/refresh - re-read every collection from the store.
///
/// Recovery path for updates missed on both sync channels.
pub async fn force_refresh(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    state.workspace.force_refresh().await;

    let counts = state.workspace.counts().await;
    success(
        DashboardStats {
            tools: counts.tools,
            guides: counts.guides,
            blog: counts.blog,
            sync_status: state.workspace.sync_status(),
        },
        state.workspace.revision(),
    )
}
