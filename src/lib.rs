pub mod attachment;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::attachment::AttachmentManager;
use crate::config::{Config, DokumenMode};
use crate::db::Database;
use crate::storage::LocalBlobStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub attachments: AttachmentManager,
}

/// Start the server: configuration, stores, router.
pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let config = Arc::new(config);
    tracing::info!("Configuration loaded");

    let db = Database::new(&config.database.path).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    let store = Arc::new(LocalBlobStore::new(config.storage.local_path.clone()));
    let attachments = AttachmentManager::new(store);

    let state = AppState {
        db,
        config: config.clone(),
        attachments,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes: lists, single reads, and attachment streams
    let mut public_routes = Router::new()
        .route("/pengurus", get(handlers::pengurus::list))
        .route("/pengurus/:id", get(handlers::pengurus::get))
        .route("/profil", get(handlers::profil::list))
        .route("/profil/:id", get(handlers::profil::get))
        .route("/profil/:id/gambar", get(handlers::profil::stream_gambar))
        .route("/kegiatan", get(handlers::kegiatan::list))
        .route("/kegiatan/:id", get(handlers::kegiatan::get))
        .route(
            "/kegiatan/:id/dokumentasi",
            get(handlers::kegiatan::stream_dokumentasi),
        );

    // Admin-only mutation routes
    let mut admin_routes = Router::new()
        .route("/pengurus", post(handlers::pengurus::create))
        .route("/pengurus/:id", put(handlers::pengurus::update))
        .route("/pengurus/:id", delete(handlers::pengurus::delete))
        .route("/profil", post(handlers::profil::create))
        .route("/profil/:id", put(handlers::profil::update))
        .route("/profil/:id", delete(handlers::profil::delete))
        .route("/kegiatan", post(handlers::kegiatan::create))
        .route("/kegiatan/:id", put(handlers::kegiatan::update))
        .route("/kegiatan/:id", delete(handlers::kegiatan::delete));

    // A deployment exposes exactly one dokumen schema (see DESIGN.md).
    match state.config.dokumen.mode {
        DokumenMode::Tunggal => {
            public_routes = public_routes
                .route("/dokumen", get(handlers::dokumen::list))
                .route("/dokumen/:id", get(handlers::dokumen::get))
                .route("/dokumen/:id/file", get(handlers::dokumen::stream_file));
            admin_routes = admin_routes
                .route("/dokumen", post(handlers::dokumen::create))
                .route("/dokumen/:id", put(handlers::dokumen::update))
                .route("/dokumen/:id", delete(handlers::dokumen::delete));
        }
        DokumenMode::Bundel => {
            public_routes = public_routes
                .route("/dokumen", get(handlers::dokumen_bundel::list))
                .route("/dokumen/:id", get(handlers::dokumen_bundel::get))
                .route(
                    "/dokumen/:id/pdf/:slot",
                    get(handlers::dokumen_bundel::stream_slot),
                );
            admin_routes = admin_routes
                .route("/dokumen", post(handlers::dokumen_bundel::create))
                .route("/dokumen/:id", put(handlers::dokumen_bundel::update))
                .route("/dokumen/:id", delete(handlers::dokumen_bundel::delete));
        }
    }

    let admin_routes = admin_routes.layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::require_admin,
    ));

    Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
