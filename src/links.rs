use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{TypedHeader, headers::Host};
use uuid::Uuid;

use crate::router::AppState;

/// Public registration form a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationLink {
    Event(Uuid),
    Worker,
}

impl RegistrationLink {
    pub fn path(self) -> String {
        match self {
            RegistrationLink::Event(id) => format!("/form/event/{id}"),
            RegistrationLink::Worker => "/form/worker".to_string(),
        }
    }

    pub fn url(self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.path())
    }
}

/// Scheme and authority the links are built on, e.g. `https://civis.example.org`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub String);

impl RequestOrigin {
    pub fn resolve(
        public_url: Option<&str>,
        host: Option<&Host>,
        forwarded_proto: Option<&str>,
    ) -> Self {
        if let Some(url) = public_url {
            return Self(url.trim_end_matches('/').to_string());
        }
        let scheme = forwarded_proto
            .and_then(|proto| proto.split(',').next())
            .map(str::trim)
            .filter(|proto| matches!(*proto, "http" | "https"))
            .unwrap_or("http");
        let authority = match host {
            Some(host) => match host.port() {
                Some(port) => format!("{}:{port}", host.hostname()),
                None => host.hostname().to_string(),
            },
            None => "localhost".to_string(),
        };
        Self(format!("{scheme}://{authority}"))
    }

    pub fn link(&self, link: RegistrationLink) -> String {
        link.url(&self.0)
    }
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let host = TypedHeader::<Host>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(host)| host);
        let forwarded_proto = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok());
        Ok(Self::resolve(
            state.config.public_url.as_deref(),
            host.as_ref(),
            forwarded_proto,
        ))
    }
}
