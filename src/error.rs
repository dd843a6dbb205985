use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::{export::ExportError, store::StoreError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("form upload error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "No encontrado."),
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "Formulario inválido."),
            AppError::Store(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "No se pudieron cargar los datos. Verifica tu conexión e intenta de nuevo.",
            ),
            AppError::Template(_) | AppError::Export(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno.")
            }
        };
        if status.is_server_error() {
            error!("{self}");
        }

        (
            status,
            Html(format!(
                "<!DOCTYPE html><html lang=\"es\"><head><meta charset=\"utf-8\">\
                 <title>CivisCore</title></head><body><h1>Atención</h1><p>{message}</p>\
                 <p><a href=\"/\">Volver</a></p></body></html>"
            )),
        )
            .into_response()
    }
}
