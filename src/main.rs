//! Zemora Content Backend
//!
//! Serves the admin panel for the three content collections (tools, guides,
//! blog) with local-first JSON persistence and best-effort multi-instance
//! synchronization, plus the read-only public page projections.

mod api;
mod auth;
mod config;
mod errors;
mod forms;
mod models;
mod query;
mod render;
mod store;
mod sync;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use store::{JsonStore, PublicCatalog, Workspace};
use sync::SyncHub;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub catalog: Arc<PublicCatalog>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Zemora Content Backend");
    tracing::info!("Data dir: {:?}", config.data_dir);
    tracing::info!("Seed dir: {:?}", config.seed_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_password == config::DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("Using the default admin password. Set ZEMORA_ADMIN_PASSWORD!");
    }

    // Initialize the store and the admin workspace
    let store = Arc::new(JsonStore::new(&config.data_dir));
    let workspace = Arc::new(Workspace::new(
        Arc::clone(&store),
        SyncHub::new(),
        &config.seed_dir,
    ));
    workspace.initialize().await;

    let counts = workspace.counts().await;
    tracing::info!(
        "Collections loaded: {} tools, {} guides, {} blog posts",
        counts.tools,
        counts.guides,
        counts.blog
    );

    // Wire both inbound sync channels
    sync::spawn_hub_listener(Arc::clone(&workspace));
    match sync::spawn_storage_watcher(Arc::clone(&workspace), Arc::clone(&store)) {
        Ok(_) => tracing::info!("Storage watcher active on {:?}", store.dir()),
        Err(err) => tracing::warn!("Storage watcher unavailable: {}", err),
    }

    // Log the re-render signal: every accepted mutation bumps it
    let mut render = workspace.subscribe_render();
    tokio::spawn(async move {
        while render.changed().await.is_ok() {
            let revision = *render.borrow();
            tracing::debug!("views re-rendered at revision {}", revision);
        }
    });

    // One-shot snapshot for the public pages
    let catalog = Arc::new(PublicCatalog::load(&config.seed_dir));

    // Create application state
    let state = AppState {
        workspace,
        catalog,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the password for the auth layer
    let password = state.config.admin_password.clone();

    // Admin routes, guarded by the shared-secret middleware
    let admin_routes = Router::new()
        // Tools
        .route("/tools", get(api::list_tools))
        .route("/tools", post(api::create_tool))
        .route("/tools/{id}", put(api::update_tool))
        .route("/tools/{id}", delete(api::delete_tool))
        .route("/tools/{id}/form", get(api::tool_form))
        // Guides
        .route("/guides", get(api::list_guides))
        .route("/guides", post(api::create_guide))
        .route("/guides/{id}", put(api::update_guide))
        .route("/guides/{id}", delete(api::delete_guide))
        .route("/guides/{id}/form", get(api::guide_form))
        // Blog
        .route("/blog", get(api::list_posts))
        .route("/blog", post(api::create_post))
        .route("/blog/{id}", put(api::update_post))
        .route("/blog/{id}", delete(api::delete_post))
        .route("/blog/{id}/form", get(api::post_form))
        // Import/export
        .route("/export/{dataset}", get(api::export_dataset))
        .route("/import/{dataset}", post(api::import_dataset))
        // Dashboard
        .route("/stats", get(api::stats))
        .route("/refresh", post(api::force_refresh))
        .route("/events", get(api::subscribe_events))
        // Apply shared-secret auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(password.clone(), req, next)
        }));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/login", post(api::login))
        .route("/api/pages/tools", get(api::tools_page))
        .route("/api/pages/guides", get(api::guides_page))
        .route("/api/pages/blog", get(api::blog_page))
        .route("/api/pages/home", get(api::home_page))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api/admin", admin_routes)
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
