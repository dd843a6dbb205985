use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use minijinja::context;
use tracing::info;

use super::{EventId, xlsx_download};
use crate::{
    error::AppError, export::workbook_bytes, router::AppState, stats::EventStats,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/{id}", get(event_stats))
        .route("/stats/{id}/export", get(export_attendees))
}

/// Attendees stay visible after their event is deleted, so a missing event
/// is not an error here.
pub async fn event_stats(
    State(state): State<AppState>,
    EventId(id): EventId,
) -> Result<Response, AppError> {
    let event = state.repo.find_event(id).await?;
    let attendees = state.repo.list_attendees_for_event(id).await?;
    let stats = EventStats::from_attendees(&attendees);

    let html = state.render(
        "stats.html",
        context! {
            event_id => id,
            event => event,
            stats => stats,
            attendees => attendees,
        },
    )?;
    Ok(html.into_response())
}

pub async fn export_attendees(
    State(state): State<AppState>,
    EventId(id): EventId,
) -> Result<Response, AppError> {
    let event = state.repo.find_event(id).await?;
    let attendees = state.repo.list_attendees_for_event(id).await?;
    let bytes = workbook_bytes(&attendees)?;
    info!(%id, rows = attendees.len(), "Exporting attendees");

    let base = match event {
        Some(event) => format!("Asistentes - {}", event.title.trim()),
        None => "Asistentes".to_string(),
    };
    Ok(xlsx_download(&base, bytes))
}
