//! Public registration: validate, reject duplicate id numbers, upload the ID
//! photo if there is one, then write the record.

use axum::body::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    config::PhotoPolicy,
    entities::sea_orm_active_enums::Sector,
    store::{
        CampaignRepository, NewRegistrant, PhotoStore, Registrant, RegistrationScope, StoreError,
    },
};

pub const DUPLICATE_MESSAGE: &str = "Esta cédula ya está registrada. No se permiten duplicados.";
pub const BACKEND_MESSAGE: &str = "Error al guardar. Verifica tu conexión.";

/// File extensions kept on stored photos. Anything else is stored without one.
pub const PHOTO_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "heic", "gif"];

/// Raw form input, exactly as submitted.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub id_number: String,
    pub phone: String,
    pub sector: String,
    pub photo: Option<PhotoUpload>,
}

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl PhotoUpload {
    /// Parts without a declared type pass; declared ones must be `image/*`.
    fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|mime| mime.trim().to_ascii_lowercase().starts_with("image/"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("id number already registered")]
    Duplicate,

    #[error(transparent)]
    Backend(StoreError),
}

impl RegistrationError {
    /// Text shown to the person filling in the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            RegistrationError::Validation(message) => message,
            RegistrationError::Duplicate => DUPLICATE_MESSAGE,
            RegistrationError::Backend(_) => BACKEND_MESSAGE,
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => RegistrationError::Duplicate,
            other => RegistrationError::Backend(other),
        }
    }
}

/// Photo requirement for a scope.
pub fn photo_policy(scope: RegistrationScope, attendee_photo: PhotoPolicy) -> PhotoPolicy {
    match scope {
        RegistrationScope::Worker => PhotoPolicy::Required,
        RegistrationScope::Event(_) => attendee_photo,
    }
}

struct Validated {
    name: String,
    id_number: String,
    phone: String,
    sector: Sector,
    photo: Option<PhotoUpload>,
}

fn validate(submission: Submission, policy: PhotoPolicy) -> Result<Validated, RegistrationError> {
    let name = submission.name.trim().to_string();
    let id_number = submission.id_number.trim().to_string();
    let phone = submission.phone.trim().to_string();

    if name.is_empty() {
        return Err(RegistrationError::Validation("El nombre es obligatorio."));
    }
    if id_number.is_empty() {
        return Err(RegistrationError::Validation("La cédula es obligatoria."));
    }
    if phone.is_empty() {
        return Err(RegistrationError::Validation("El celular es obligatorio."));
    }
    let sector = submission
        .sector
        .trim()
        .parse::<Sector>()
        .map_err(|_| RegistrationError::Validation("Seleccione un sector válido."))?;

    let photo = match policy {
        PhotoPolicy::Disabled => None,
        PhotoPolicy::Optional => submission.photo,
        PhotoPolicy::Required => Some(
            submission
                .photo
                .ok_or(RegistrationError::Validation("La foto de la cédula es obligatoria."))?,
        ),
    };

    if photo.as_ref().is_some_and(|photo| !photo.is_image()) {
        return Err(RegistrationError::Validation(
            "La foto de la cédula debe ser una imagen.",
        ));
    }

    Ok(Validated {
        name,
        id_number,
        phone,
        sector,
        photo,
    })
}

/// Storage key for an ID photo: `ids/{scope}_{unix millis}_{id number}[.ext]`.
pub fn photo_key(
    scope: RegistrationScope,
    id_number: &str,
    timestamp_millis: i64,
    file_name: Option<&str>,
) -> String {
    // The id number is free text; only its safe characters go into the key.
    let id_part: String = id_number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let scope_tag = match scope {
        RegistrationScope::Worker => "worker".to_string(),
        RegistrationScope::Event(id) => format!("event_{id}"),
    };
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()));

    match extension {
        Some(ext) => format!("ids/{scope_tag}_{timestamp_millis}_{id_part}.{ext}"),
        None => format!("ids/{scope_tag}_{timestamp_millis}_{id_part}"),
    }
}

pub async fn register(
    repo: &dyn CampaignRepository,
    photos: &dyn PhotoStore,
    scope: RegistrationScope,
    attendee_photo: PhotoPolicy,
    submission: Submission,
) -> Result<Registrant, RegistrationError> {
    let validated = validate(submission, photo_policy(scope, attendee_photo))?;

    if repo
        .find_by_id_number(scope, &validated.id_number)
        .await?
        .is_some()
    {
        info!(?scope, "Rejected duplicate id number");
        return Err(RegistrationError::Duplicate);
    }

    let now = Utc::now();
    let photo_url = match validated.photo {
        Some(photo) => {
            let key = photo_key(
                scope,
                &validated.id_number,
                now.timestamp_millis(),
                photo.file_name.as_deref(),
            );
            let handle = photos.upload(&key, photo.bytes).await?;
            Some(photos.public_url(&handle).await?)
        }
        None => None,
    };

    let registrant = NewRegistrant {
        name: validated.name,
        id_number: validated.id_number,
        phone: validated.phone,
        sector: validated.sector,
        photo_url: photo_url.clone(),
        registered_at: now,
    };

    match repo.create_record(scope, registrant).await {
        Ok(record) => {
            info!(?scope, id = %record.id, "Registration saved");
            Ok(record)
        }
        Err(err) => {
            if let Some(url) = photo_url {
                warn!(%url, "Uploaded photo left without a record");
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::{
        database::setup_database,
        store::{PhotoHandle, SeaOrmRepository},
    };

    /// Records uploads in memory, optionally failing every call.
    #[derive(Default)]
    struct RecordingPhotos {
        keys: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl PhotoStore for RecordingPhotos {
        async fn upload(&self, key: &str, _bytes: Bytes) -> Result<PhotoHandle, StoreError> {
            if self.fail {
                return Err(StoreError::Io(std::io::Error::other("bucket unavailable")));
            }
            self.keys.lock().unwrap().push(key.to_string());
            Ok(PhotoHandle {
                key: key.to_string(),
            })
        }

        async fn public_url(&self, handle: &PhotoHandle) -> Result<String, StoreError> {
            Ok(format!("/uploads/{}", handle.key))
        }
    }

    async fn repository() -> SeaOrmRepository {
        SeaOrmRepository::new(setup_database("sqlite::memory:").await.unwrap())
    }

    fn submission(id_number: &str, with_photo: bool) -> Submission {
        Submission {
            name: " Juan Pérez ".to_string(),
            id_number: id_number.to_string(),
            phone: "3001234567".to_string(),
            sector: "Filadelfia".to_string(),
            photo: with_photo.then(|| PhotoUpload {
                file_name: Some("cedula.JPG".to_string()),
                content_type: Some("image/jpeg".to_string()),
                bytes: Bytes::from_static(b"photo"),
            }),
        }
    }

    #[tokio::test]
    async fn worker_registered_twice_is_rejected_the_second_time() {
        let repo = repository().await;
        let photos = RecordingPhotos::default();

        let first = register(
            &repo,
            &photos,
            RegistrationScope::Worker,
            PhotoPolicy::Disabled,
            submission("12345678", true),
        )
        .await
        .unwrap();
        assert_eq!(first.name, "Juan Pérez");
        assert!(first.photo_url.as_deref().unwrap().starts_with("/uploads/ids/worker_"));
        assert!(first.photo_url.as_deref().unwrap().ends_with("_12345678.jpg"));

        let second = register(
            &repo,
            &photos,
            RegistrationScope::Worker,
            PhotoPolicy::Disabled,
            submission("12345678", true),
        )
        .await
        .unwrap_err();
        assert!(matches!(second, RegistrationError::Duplicate));
        assert_eq!(second.user_message(), DUPLICATE_MESSAGE);

        assert_eq!(repo.list_workers().await.unwrap().len(), 1);
        // The duplicate never reached the photo store.
        assert_eq!(photos.keys.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn worker_without_photo_is_rejected_before_the_store() {
        let repo = repository().await;
        let err = register(
            &repo,
            &RecordingPhotos::default(),
            RegistrationScope::Worker,
            PhotoPolicy::Disabled,
            submission("1", false),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::Validation(_)));
        assert!(repo.list_workers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn attendee_uniqueness_is_per_event() {
        let repo = repository().await;
        let photos = RecordingPhotos::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        for event in [a, b] {
            register(
                &repo,
                &photos,
                RegistrationScope::Event(event),
                PhotoPolicy::Disabled,
                submission("777", true),
            )
            .await
            .unwrap();
        }
        let again = register(
            &repo,
            &photos,
            RegistrationScope::Event(a),
            PhotoPolicy::Disabled,
            submission("777", false),
        )
        .await
        .unwrap_err();
        assert!(matches!(again, RegistrationError::Duplicate));

        // Photos are ignored for attendees unless the policy asks for them.
        let attendees = repo.list_attendees_for_event(a).await.unwrap();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0].photo_url, None);
        assert!(photos.keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn optional_attendee_photo_may_be_missing() {
        let repo = repository().await;
        let photos = RecordingPhotos::default();
        let event = Uuid::new_v4();

        let without = register(
            &repo,
            &photos,
            RegistrationScope::Event(event),
            PhotoPolicy::Optional,
            submission("1", false),
        )
        .await
        .unwrap();
        let with = register(
            &repo,
            &photos,
            RegistrationScope::Event(event),
            PhotoPolicy::Optional,
            submission("2", true),
        )
        .await
        .unwrap();

        assert_eq!(without.photo_url, None);
        let url = with.photo_url.unwrap();
        assert!(url.starts_with(&format!("/uploads/ids/event_{event}_")));
    }

    #[tokio::test]
    async fn failed_upload_writes_nothing() {
        let repo = repository().await;
        let photos = RecordingPhotos {
            fail: true,
            ..Default::default()
        };
        let err = register(
            &repo,
            &photos,
            RegistrationScope::Worker,
            PhotoPolicy::Disabled,
            submission("99", true),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::Backend(_)));
        assert_eq!(err.user_message(), BACKEND_MESSAGE);
        assert!(repo.list_workers().await.unwrap().is_empty());
    }

    #[test]
    fn validation_rejects_bad_input() {
        let cases = [
            Submission {
                name: "   ".into(),
                ..submission("1", true)
            },
            Submission {
                id_number: " ".into(),
                ..submission("1", true)
            },
            Submission {
                phone: String::new(),
                ..submission("1", true)
            },
            Submission {
                sector: "Otro".into(),
                ..submission("1", true)
            },
        ];
        for case in cases {
            assert!(matches!(
                validate(case, PhotoPolicy::Required),
                Err(RegistrationError::Validation(_))
            ));
        }
    }

    #[test]
    fn photo_key_sanitizes_the_extension() {
        let event = Uuid::nil();
        assert_eq!(
            photo_key(RegistrationScope::Worker, "123", 1700, Some("foto.PNG")),
            "ids/worker_1700_123.png"
        );
        assert_eq!(
            photo_key(RegistrationScope::Event(event), "123", 1700, Some("weird.j/pg")),
            format!("ids/event_{event}_1700_123")
        );
        assert_eq!(
            photo_key(RegistrationScope::Worker, "123", 1700, None),
            "ids/worker_1700_123"
        );
    }

    #[test]
    fn id_number_is_free_text() {
        let validated = validate(submission(" 1.234.567 ", true), PhotoPolicy::Required).unwrap();
        assert_eq!(validated.id_number, "1.234.567");
        assert_eq!(
            photo_key(RegistrationScope::Worker, &validated.id_number, 1700, Some("c.jpg")),
            "ids/worker_1700_1_234_567.jpg"
        );
        assert_eq!(
            photo_key(RegistrationScope::Worker, "../x", 1700, None),
            "ids/worker_1700____x"
        );
    }

    #[test]
    fn photo_key_drops_non_image_extensions() {
        for name in ["x.html", "x.htm", "x.svg", "x.js", "x.jpg.html"] {
            assert_eq!(
                photo_key(RegistrationScope::Worker, "123", 1700, Some(name)),
                "ids/worker_1700_123",
                "{name}"
            );
        }
        assert_eq!(
            photo_key(RegistrationScope::Worker, "123", 1700, Some("scan.WebP")),
            "ids/worker_1700_123.webp"
        );
    }

    #[tokio::test]
    async fn non_image_photo_is_rejected_before_upload() {
        let repo = repository().await;
        let photos = RecordingPhotos::default();
        let mut html = submission("42", true);
        if let Some(photo) = html.photo.as_mut() {
            photo.file_name = Some("x.html".to_string());
            photo.content_type = Some("text/html".to_string());
        }

        let err = register(
            &repo,
            &photos,
            RegistrationScope::Worker,
            PhotoPolicy::Disabled,
            html,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::Validation(_)));
        assert!(photos.keys.lock().unwrap().is_empty());
        assert!(repo.list_workers().await.unwrap().is_empty());
    }
}
