use civiscore::{
    config::Config,
    database::setup_database,
    router::{AppState, create_router, shutdown_signal},
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = setup_database(&config.database_url).await?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    info!(
        bind_addr = %config.bind_addr,
        upload_dir = %config.upload_dir.display(),
        attendee_photo = %config.attendee_photo,
        cascade_event_delete = config.cascade_event_delete,
        "Starting CivisCore"
    );

    let listener = TcpListener::bind(config.bind_addr).await?;
    let app = create_router(AppState::new(db, config));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
