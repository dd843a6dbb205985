use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::Context;
use tracing::info;

/// Whether event attendees are asked for an ID photo. Workers always are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhotoPolicy {
    #[default]
    Disabled,
    Optional,
    Required,
}

impl FromStr for PhotoPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(Self::Disabled),
            "optional" => Ok(Self::Optional),
            "required" => Ok(Self::Required),
            other => anyhow::bail!("unknown photo policy {other:?}"),
        }
    }
}

impl Display for PhotoPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Disabled => "disabled",
            Self::Optional => "optional",
            Self::Required => "required",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    /// Origin used for shareable links, e.g. `https://civis.example.org`.
    /// Falls back to the request's Host header when unset.
    pub public_url: Option<String>,
    pub upload_dir: PathBuf,
    pub attendee_photo: PhotoPolicy,
    pub cascade_event_delete: bool,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env is fine, the variables may come from the environment.
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("failed to read .env");
            }
        }

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let public_url = env::var("PUBLIC_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            database_url,
            rust_log,
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:3000")?,
            public_url,
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            attendee_photo: try_load("ATTENDEE_PHOTO", "disabled")?,
            cascade_event_delete: try_load("CASCADE_EVENT_DELETE", "false")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid {key} value {raw:?}: {e}"))
}
