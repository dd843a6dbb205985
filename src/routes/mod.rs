use axum::{
    extract::{FromRequestParts, Path},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::AppError,
    export::{XLSX_CONTENT_TYPE, content_disposition},
};

pub mod dashboard;
pub mod form;
pub mod stats;

/// Download response for a generated workbook named `{base}.xlsx`.
fn xlsx_download(base: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(base)),
        ],
        bytes,
    )
        .into_response()
}

/// Event id taken from the `{id}` path segment. Anything that is not a UUID
/// gets the regular not-found page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventId(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for EventId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                debug!("Rejected event path {}: {rejection}", parts.uri.path());
                Err(AppError::NotFound)
            }
        }
    }
}
