//! Public page endpoints.
//!
//! These project the one-shot seed snapshot through the filter/sort engine
//! and the renderer. There is no write-back and no coupling to the admin
//! workspace; a failed snapshot load renders as an error banner.

use axum::{
    extract::{Query, State},
    Json,
};

use super::{GuideListParams, PostListParams, ToolListParams};
use crate::query;
use crate::render::{self, BlogCard, GuideCard, HomeView, PageView, ToolCard};
use crate::AppState;

/// GET /api/pages/tools - the tools page card grid.
pub async fn tools_page(
    State(state): State<AppState>,
    Query(params): Query<ToolListParams>,
) -> Json<PageView<ToolCard>> {
    let view = match &state.catalog.tools {
        Ok(records) => {
            let filtered = query::filter_tools(records, &params.to_query());
            PageView::ok(
                filtered.iter().map(render::tool_card).collect(),
                "No tools found. Try a different search or browse categories.",
            )
        }
        Err(message) => PageView::failed(message),
    };
    Json(view)
}

/// GET /api/pages/guides - the guides page card list.
pub async fn guides_page(
    State(state): State<AppState>,
    Query(params): Query<GuideListParams>,
) -> Json<PageView<GuideCard>> {
    let view = match &state.catalog.guides {
        Ok(records) => {
            let filtered =
                query::filter_guides(records, params.query.as_deref().unwrap_or_default());
            PageView::ok(
                filtered.iter().map(render::guide_card).collect(),
                "No guides found. Try another keyword.",
            )
        }
        Err(message) => PageView::failed(message),
    };
    Json(view)
}

/// GET /api/pages/blog - the blog page card list.
pub async fn blog_page(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> Json<PageView<BlogCard>> {
    let view = match &state.catalog.blog {
        Ok(records) => {
            let filtered = query::filter_posts(records, &params.to_query());
            PageView::ok(
                filtered.iter().map(render::blog_card).collect(),
                "No posts found. Try another keyword.",
            )
        }
        Err(message) => PageView::failed(message),
    };
    Json(view)
}

/// GET /api/pages/home - featured tools and latest guides.
pub async fn home_page(State(state): State<AppState>) -> Json<HomeView> {
    let tools = state.catalog.tools.as_deref().unwrap_or(&[]);
    let guides = state.catalog.guides.as_deref().unwrap_or(&[]);
    Json(render::home_view(tools, guides))
}
