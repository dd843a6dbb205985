use axum::{
    Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use minijinja::context;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use super::EventId;
use crate::{
    config::PhotoPolicy,
    entities::{event, sea_orm_active_enums::Sector},
    error::AppError,
    registration::{self, PhotoUpload, RegistrationError, Submission},
    router::AppState,
    store::RegistrationScope,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/form/worker", get(worker_form).post(submit_worker))
        .route("/form/event/{id}", get(event_form).post(submit_event))
}

/// What the form page needs to know about where it submits to.
struct FormPage {
    scope: RegistrationScope,
    event: Option<event::Model>,
}

impl FormPage {
    fn worker() -> Self {
        Self {
            scope: RegistrationScope::Worker,
            event: None,
        }
    }

    async fn for_event(state: &AppState, id: Uuid) -> Result<Self, AppError> {
        let event = state.repo.find_event(id).await?.ok_or(AppError::NotFound)?;
        Ok(Self {
            scope: RegistrationScope::Event(id),
            event: Some(event),
        })
    }

    fn mode(&self) -> &'static str {
        match self.scope {
            RegistrationScope::Worker => "worker",
            RegistrationScope::Event(_) => "event",
        }
    }

    fn heading(&self) -> &'static str {
        match self.scope {
            RegistrationScope::Worker => "Registro de Electoreros",
            RegistrationScope::Event(_) => "Registro de Asistencia",
        }
    }

    fn success_message(&self) -> &'static str {
        match self.scope {
            RegistrationScope::Worker => "Registro completado",
            RegistrationScope::Event(_) => "Asistencia registrada",
        }
    }

    fn action(&self) -> String {
        match self.scope {
            RegistrationScope::Worker => "/form/worker".to_string(),
            RegistrationScope::Event(id) => format!("/form/event/{id}"),
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct FormValues {
    name: String,
    id_number: String,
    phone: String,
    sector: String,
}

impl From<&Submission> for FormValues {
    fn from(submission: &Submission) -> Self {
        Self {
            name: submission.name.clone(),
            id_number: submission.id_number.clone(),
            phone: submission.phone.clone(),
            sector: submission.sector.clone(),
        }
    }
}

fn photo_field(policy: PhotoPolicy) -> &'static str {
    match policy {
        PhotoPolicy::Disabled => "hidden",
        PhotoPolicy::Optional => "optional",
        PhotoPolicy::Required => "required",
    }
}

fn render_form(
    state: &AppState,
    page: &FormPage,
    status: StatusCode,
    values: FormValues,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let policy = registration::photo_policy(page.scope, state.config.attendee_photo);
    let html = state.render(
        "form.html",
        context! {
            mode => page.mode(),
            heading => page.heading(),
            event => page.event,
            action => page.action(),
            sectors => Sector::labels(),
            photo => photo_field(policy),
            values => values,
            error => error,
        },
    )?;
    Ok((status, html).into_response())
}

async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "name" => submission.name = field.text().await?,
            "id_number" => submission.id_number = field.text().await?,
            "phone" => submission.phone = field.text().await?,
            "sector" => submission.sector = field.text().await?,
            "photo" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if !bytes.is_empty() {
                    submission.photo = Some(PhotoUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            other => warn!("Ignoring unexpected form field {other:?}"),
        }
    }
    Ok(submission)
}

async fn submit(state: &AppState, page: FormPage, multipart: Multipart) -> Result<Response, AppError> {
    let submission = read_submission(multipart).await?;
    let values = FormValues::from(&submission);

    let result = registration::register(
        state.repo.as_ref(),
        state.photos.as_ref(),
        page.scope,
        state.config.attendee_photo,
        submission,
    )
    .await;

    match result {
        Ok(_) => {
            let html = state.render(
                "success.html",
                context! {
                    message => page.success_message(),
                    back => page.action(),
                },
            )?;
            Ok(html.into_response())
        }
        Err(err) => {
            let status = match &err {
                RegistrationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RegistrationError::Duplicate => StatusCode::CONFLICT,
                RegistrationError::Backend(cause) => {
                    error!("Registration failed: {cause}");
                    StatusCode::SERVICE_UNAVAILABLE
                }
            };
            render_form(state, &page, status, values, Some(err.user_message()))
        }
    }
}

pub async fn worker_form(State(state): State<AppState>) -> Result<Response, AppError> {
    render_form(&state, &FormPage::worker(), StatusCode::OK, FormValues::default(), None)
}

pub async fn submit_worker(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    submit(&state, FormPage::worker(), multipart).await
}

pub async fn event_form(
    State(state): State<AppState>,
    EventId(id): EventId,
) -> Result<Response, AppError> {
    let page = FormPage::for_event(&state, id).await?;
    render_form(&state, &page, StatusCode::OK, FormValues::default(), None)
}

pub async fn submit_event(
    State(state): State<AppState>,
    EventId(id): EventId,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let page = FormPage::for_event(&state, id).await?;
    submit(&state, page, multipart).await
}
