use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveTime};
use minijinja::context;
use sea_orm::{ActiveEnum, Iterable};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{EventId, xlsx_download};
use crate::{
    entities::{event, sea_orm_active_enums::EventKind},
    error::AppError,
    export::workbook_bytes,
    links::{RegistrationLink, RequestOrigin},
    router::AppState,
    store::{NewEvent, Registrant},
};

/// Rows of the worker table shown on the dashboard; the export has them all.
pub const WORKER_PREVIEW_ROWS: usize = 5;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/events", post(create_event))
        .route("/events/{id}/delete", get(confirm_delete).post(delete_event))
        .route("/workers/export", get(export_workers))
}

#[derive(Deserialize)]
pub struct DashboardParams {
    /// Event whose registration link panel starts open.
    links: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub leader: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl EventForm {
    pub fn validate(&self) -> Result<NewEvent, &'static str> {
        let title = self.title.trim();
        let leader = self.leader.trim();
        let location = self.location.trim();
        if title.is_empty() || leader.is_empty() || location.is_empty() {
            return Err("Completa todos los campos del evento.");
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "La fecha no es válida.")?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(self.time.trim(), "%H:%M:%S"))
            .map_err(|_| "La hora no es válida.")?;
        let kind = match self.kind.trim() {
            "" => EventKind::default(),
            raw => EventKind::try_from_value(&raw.to_string())
                .map_err(|_| "Tipo de evento desconocido.")?,
        };

        Ok(NewEvent {
            title: title.to_string(),
            date,
            time,
            location: location.to_string(),
            leader: leader.to_string(),
            kind,
        })
    }
}

#[derive(Serialize)]
struct EventView {
    id: Uuid,
    title: String,
    date: String,
    time: String,
    location: String,
    leader: String,
    kind: &'static str,
    attendance_link: String,
}

impl EventView {
    fn new(event: event::Model, origin: &RequestOrigin) -> Self {
        Self {
            id: event.id,
            attendance_link: origin.link(RegistrationLink::Event(event.id)),
            title: event.title,
            date: event.date.format("%Y-%m-%d").to_string(),
            time: event.time.format("%H:%M").to_string(),
            location: event.location,
            leader: event.leader,
            kind: event.kind.label(),
        }
    }
}

#[derive(Serialize)]
struct KindOption {
    value: String,
    label: &'static str,
}

async fn render_dashboard(
    state: &AppState,
    origin: &RequestOrigin,
    open_links: Option<Uuid>,
    form: Option<(EventForm, &'static str)>,
) -> Result<Response, AppError> {
    let events = state.repo.list_events().await?;
    let workers = state.repo.list_workers().await?;

    let event_count = events.len();
    let worker_count = workers.len();
    let events: Vec<EventView> = events
        .into_iter()
        .map(|event| EventView::new(event, origin))
        .collect();
    let worker_preview: Vec<Registrant> = workers.into_iter().take(WORKER_PREVIEW_ROWS).collect();
    let kinds: Vec<KindOption> = EventKind::iter()
        .map(|kind| KindOption {
            value: kind.to_value(),
            label: kind.label(),
        })
        .collect();

    let (status, form_values, form_error) = match form {
        Some((values, error)) => (StatusCode::UNPROCESSABLE_ENTITY, values, Some(error)),
        None => (StatusCode::OK, EventForm::default(), None),
    };

    let html = state.render(
        "dashboard.html",
        context! {
            events => events,
            event_count => event_count,
            workers => worker_preview,
            worker_count => worker_count,
            worker_link => origin.link(RegistrationLink::Worker),
            open_links => open_links,
            kinds => kinds,
            form => form_values,
            form_error => form_error,
        },
    )?;
    Ok((status, html).into_response())
}

pub async fn dashboard(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Query(params): Query<DashboardParams>,
) -> Result<Response, AppError> {
    render_dashboard(&state, &origin, params.links, None).await
}

pub async fn create_event(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let new_event = match form.validate() {
        Ok(new_event) => new_event,
        Err(message) => return render_dashboard(&state, &origin, None, Some((form, message))).await,
    };

    let event = state.repo.create_event(new_event).await?;
    info!(id = %event.id, title = %event.title, "Event created");
    Ok(Redirect::to(&format!("/?links={}#event-{}", event.id, event.id)).into_response())
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    EventId(id): EventId,
) -> Result<Response, AppError> {
    let event = state.repo.find_event(id).await?.ok_or(AppError::NotFound)?;
    let html = state.render(
        "confirm_delete.html",
        context! {
            event => event,
            cascade => state.config.cascade_event_delete,
        },
    )?;
    Ok(html.into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    EventId(id): EventId,
) -> Result<Response, AppError> {
    if state.config.cascade_event_delete {
        let removed = state
            .repo
            .delete_event_with_attendees(id)
            .await?
            .ok_or(AppError::NotFound)?;
        info!(%id, removed, "Event deleted with its attendees");
    } else {
        if !state.repo.delete_event(id).await? {
            return Err(AppError::NotFound);
        }
        info!(%id, "Event deleted");
    }

    Ok(Redirect::to("/").into_response())
}

pub async fn export_workers(State(state): State<AppState>) -> Result<Response, AppError> {
    let workers = state.repo.list_workers().await?;
    let bytes = workbook_bytes(&workers)?;
    info!(rows = workers.len(), "Exporting workers");
    Ok(xlsx_download("Electoreros", bytes))
}
