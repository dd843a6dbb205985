//! Narrow persistence interface the views talk to.
//!
//! Documents live behind [`CampaignRepository`], uploaded ID photos behind
//! [`PhotoStore`]. Handlers only ever see these traits, so the backing store
//! can be swapped (Postgres in production, SQLite in tests).

mod photos;
mod db;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    electoral_worker, event, event_attendee,
    sea_orm_active_enums::{EventKind, Sector},
};

pub use self::photos::LocalPhotoStore;
pub use self::db::SeaOrmRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("a record with this id number already exists")]
    Duplicate,

    #[error("invalid photo key {0:?}")]
    InvalidKey(String),
}

/// Where a registration is recorded and how far its uniqueness reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationScope {
    /// Standalone worker registration, id numbers are unique globally.
    Worker,
    /// Attendance for one event, id numbers are unique per event.
    Event(Uuid),
}

impl RegistrationScope {
    pub fn event_id(self) -> Option<Uuid> {
        match self {
            RegistrationScope::Worker => None,
            RegistrationScope::Event(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub leader: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub struct NewRegistrant {
    pub name: String,
    pub id_number: String,
    pub phone: String,
    pub sector: Sector,
    pub photo_url: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// A worker or attendee row. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registrant {
    pub id: Uuid,
    pub name: String,
    pub id_number: String,
    pub phone: String,
    pub sector: Sector,
    pub photo_url: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub event_id: Option<Uuid>,
}

impl From<electoral_worker::Model> for Registrant {
    fn from(worker: electoral_worker::Model) -> Self {
        Self {
            id: worker.id,
            name: worker.name,
            id_number: worker.id_number,
            phone: worker.phone,
            sector: worker.sector,
            photo_url: worker.photo_url,
            registered_at: worker.registered_at,
            event_id: None,
        }
    }
}

impl From<event_attendee::Model> for Registrant {
    fn from(attendee: event_attendee::Model) -> Self {
        Self {
            id: attendee.id,
            name: attendee.name,
            id_number: attendee.id_number,
            phone: attendee.phone,
            sector: attendee.sector,
            photo_url: attendee.photo_url,
            registered_at: attendee.registered_at,
            event_id: Some(attendee.event_id),
        }
    }
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// All events, newest first.
    async fn list_events(&self) -> Result<Vec<event::Model>, StoreError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<event::Model>, StoreError>;

    async fn create_event(&self, event: NewEvent) -> Result<event::Model, StoreError>;

    /// Removes the event document only. Returns `false` if it did not exist.
    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Removes the event and every attendee row pointing at it in one
    /// transaction. Returns the number of attendees removed, or `None` if the
    /// event did not exist (nothing is removed then).
    async fn delete_event_with_attendees(&self, id: Uuid) -> Result<Option<u64>, StoreError>;

    async fn list_workers(&self) -> Result<Vec<Registrant>, StoreError>;

    async fn list_attendees_for_event(&self, event_id: Uuid)
    -> Result<Vec<Registrant>, StoreError>;

    async fn find_by_id_number(
        &self,
        scope: RegistrationScope,
        id_number: &str,
    ) -> Result<Option<Registrant>, StoreError>;

    /// Inserts a registrant. Fails with [`StoreError::Duplicate`] when the
    /// id number is already taken within `scope`.
    async fn create_record(
        &self,
        scope: RegistrationScope,
        registrant: NewRegistrant,
    ) -> Result<Registrant, StoreError>;
}

/// Opaque reference to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoHandle {
    pub key: String,
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn upload(&self, key: &str, bytes: Bytes) -> Result<PhotoHandle, StoreError>;

    async fn public_url(&self, handle: &PhotoHandle) -> Result<String, StoreError>;
}
