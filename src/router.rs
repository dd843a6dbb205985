use crate::{
    config::Config,
    error::AppError,
    routes::{dashboard, form, stats},
    store::{CampaignRepository, LocalPhotoStore, PhotoStore, SeaOrmRepository},
    util::asset_loader::AssetLoader,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    response::{Html, IntoResponse},
    routing::get_service,
};
use minijinja::Environment;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tokio::signal;
use tower_http::{services::ServeDir, set_header::SetResponseHeader, trace::TraceLayer};

pub const UPLOADS_PREFIX: &str = "/uploads";

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CampaignRepository>,
    pub photos: Arc<dyn PhotoStore>,
    pub templates: Arc<Environment<'static>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let photos = LocalPhotoStore::new(config.upload_dir.clone(), UPLOADS_PREFIX);
        Self {
            repo: Arc::new(SeaOrmRepository::new(db)),
            photos: Arc::new(photos),
            templates: Arc::new(setup_templates()),
            config: Arc::new(config),
        }
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, AppError> {
        let tmpl = self.templates.get_template(name)?;
        Ok(Html(tmpl.render(ctx)?))
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    // Uploads are user content; never let browsers sniff them into markup.
    let uploads = SetResponseHeader::overriding(
        ServeDir::new(state.config.upload_dir.clone()),
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    Router::new()
        .merge(dashboard::routes())
        .merge(form::routes())
        .merge(stats::routes())
        .fallback(not_found)
        .with_state(state)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .nest_service(UPLOADS_PREFIX, get_service(uploads))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

fn setup_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader("templates"));
    let asset_loader = AssetLoader::new();
    asset_loader.register(&mut env);
    env
}

async fn not_found() -> impl IntoResponse {
    AppError::NotFound
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
}
