use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::{
    CampaignRepository, NewEvent, NewRegistrant, Registrant, RegistrationScope, StoreError,
};
use crate::entities::{electoral_worker, event, event_attendee, prelude::*};

#[derive(Debug, Clone)]
pub struct SeaOrmRepository {
    db: DatabaseConnection,
}

impl SeaOrmRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Unique index violations mean another submission with the same id number
/// got written first.
fn map_insert_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CampaignRepository for SeaOrmRepository {
    async fn list_events(&self) -> Result<Vec<event::Model>, StoreError> {
        let events = Event::find()
            .order_by_desc(event::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<event::Model>, StoreError> {
        Ok(Event::find_by_id(id).one(&self.db).await?)
    }

    async fn create_event(&self, new_event: NewEvent) -> Result<event::Model, StoreError> {
        let model = event::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(new_event.title),
            date: Set(new_event.date),
            time: Set(new_event.time),
            location: Set(new_event.location),
            leader: Set(new_event.leader),
            kind: Set(new_event.kind),
            created_at: Set(Utc::now()),
        };
        debug!("Creating new event: {:?}", model);
        Ok(model.insert(&self.db).await?)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = Event::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_event_with_attendees(&self, id: Uuid) -> Result<Option<u64>, StoreError> {
        let txn = self.db.begin().await?;
        let deleted = Event::delete_by_id(id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }
        let attendees = EventAttendee::delete_many()
            .filter(event_attendee::Column::EventId.eq(id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(Some(attendees.rows_affected))
    }

    async fn list_workers(&self) -> Result<Vec<Registrant>, StoreError> {
        let workers = ElectoralWorker::find()
            .order_by_asc(electoral_worker::Column::RegisteredAt)
            .all(&self.db)
            .await?;
        Ok(workers.into_iter().map(Registrant::from).collect())
    }

    async fn list_attendees_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Registrant>, StoreError> {
        let attendees = EventAttendee::find()
            .filter(event_attendee::Column::EventId.eq(event_id))
            .order_by_asc(event_attendee::Column::RegisteredAt)
            .all(&self.db)
            .await?;
        Ok(attendees.into_iter().map(Registrant::from).collect())
    }

    async fn find_by_id_number(
        &self,
        scope: RegistrationScope,
        id_number: &str,
    ) -> Result<Option<Registrant>, StoreError> {
        let existing = match scope {
            RegistrationScope::Worker => ElectoralWorker::find()
                .filter(electoral_worker::Column::IdNumber.eq(id_number))
                .one(&self.db)
                .await?
                .map(Registrant::from),
            RegistrationScope::Event(event_id) => EventAttendee::find()
                .filter(event_attendee::Column::IdNumber.eq(id_number))
                .filter(event_attendee::Column::EventId.eq(event_id))
                .one(&self.db)
                .await?
                .map(Registrant::from),
        };
        Ok(existing)
    }

    async fn create_record(
        &self,
        scope: RegistrationScope,
        registrant: NewRegistrant,
    ) -> Result<Registrant, StoreError> {
        let id = Uuid::new_v4();
        let record = match scope {
            RegistrationScope::Worker => {
                let model = electoral_worker::ActiveModel {
                    id: Set(id),
                    name: Set(registrant.name),
                    id_number: Set(registrant.id_number),
                    phone: Set(registrant.phone),
                    sector: Set(registrant.sector),
                    photo_url: Set(registrant.photo_url),
                    registered_at: Set(registrant.registered_at),
                };
                debug!("Creating new electoral worker: {:?}", model);
                model
                    .insert(&self.db)
                    .await
                    .map(Registrant::from)
                    .map_err(map_insert_error)?
            }
            RegistrationScope::Event(event_id) => {
                let model = event_attendee::ActiveModel {
                    id: Set(id),
                    event_id: Set(event_id),
                    name: Set(registrant.name),
                    id_number: Set(registrant.id_number),
                    phone: Set(registrant.phone),
                    sector: Set(registrant.sector),
                    photo_url: Set(registrant.photo_url),
                    registered_at: Set(registrant.registered_at),
                };
                debug!("Creating new event attendee: {:?}", model);
                model
                    .insert(&self.db)
                    .await
                    .map(Registrant::from)
                    .map_err(map_insert_error)?
            }
        };
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::{database::setup_database, entities::sea_orm_active_enums::{EventKind, Sector}};

    async fn repository() -> SeaOrmRepository {
        let db = setup_database("sqlite::memory:").await.unwrap();
        SeaOrmRepository::new(db)
    }

    fn new_event(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            location: "Main Sq".to_string(),
            leader: "X".to_string(),
            kind: EventKind::Rally,
        }
    }

    fn registrant(id_number: &str, sector: Sector) -> NewRegistrant {
        NewRegistrant {
            name: "Ana".to_string(),
            id_number: id_number.to_string(),
            phone: "3001234567".to_string(),
            sector,
            photo_url: None,
            registered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn events_are_listed_newest_first() {
        let repo = repository().await;
        let first = repo.create_event(new_event("First")).await.unwrap();
        // SQLite keeps timestamps as text, keep them a whole second apart.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let second = repo.create_event(new_event("Second")).await.unwrap();

        let events = repo.list_events().await.unwrap();
        let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn deleting_an_event_keeps_its_attendees_and_other_events() {
        let repo = repository().await;
        let doomed = repo.create_event(new_event("Doomed")).await.unwrap();
        let kept = repo.create_event(new_event("Kept")).await.unwrap();
        repo.create_record(
            RegistrationScope::Event(doomed.id),
            registrant("111", Sector::Samaria),
        )
        .await
        .unwrap();

        assert!(repo.delete_event(doomed.id).await.unwrap());
        assert!(!repo.delete_event(doomed.id).await.unwrap());

        assert_eq!(repo.find_event(kept.id).await.unwrap(), Some(kept));
        assert!(repo.find_event(doomed.id).await.unwrap().is_none());
        let orphans = repo.list_attendees_for_event(doomed.id).await.unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].event_id, Some(doomed.id));
    }

    #[tokio::test]
    async fn cascading_delete_removes_event_and_its_attendees_only() {
        let repo = repository().await;
        let a = repo.create_event(new_event("A")).await.unwrap().id;
        let b = repo.create_event(new_event("B")).await.unwrap().id;
        repo.create_record(RegistrationScope::Event(a), registrant("1", Sector::Morritos))
            .await
            .unwrap();
        repo.create_record(RegistrationScope::Event(a), registrant("2", Sector::Morritos))
            .await
            .unwrap();
        repo.create_record(RegistrationScope::Event(b), registrant("1", Sector::Morritos))
            .await
            .unwrap();

        assert_eq!(repo.delete_event_with_attendees(a).await.unwrap(), Some(2));
        assert!(repo.find_event(a).await.unwrap().is_none());
        assert!(repo.list_attendees_for_event(a).await.unwrap().is_empty());
        assert!(repo.find_event(b).await.unwrap().is_some());
        assert_eq!(repo.list_attendees_for_event(b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cascading_delete_of_unknown_event_keeps_orphans() {
        let repo = repository().await;
        let gone = Uuid::new_v4();
        repo.create_record(RegistrationScope::Event(gone), registrant("1", Sector::Samaria))
            .await
            .unwrap();

        assert_eq!(repo.delete_event_with_attendees(gone).await.unwrap(), None);
        assert_eq!(repo.list_attendees_for_event(gone).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn id_number_lookup_respects_scope() {
        let repo = repository().await;
        let event_id = Uuid::new_v4();
        repo.create_record(RegistrationScope::Event(event_id), registrant("42", Sector::LaPaila))
            .await
            .unwrap();

        let found = repo
            .find_by_id_number(RegistrationScope::Event(event_id), "42")
            .await
            .unwrap();
        assert!(found.is_some());
        let other_event = repo
            .find_by_id_number(RegistrationScope::Event(Uuid::new_v4()), "42")
            .await
            .unwrap();
        assert!(other_event.is_none());
        let as_worker = repo
            .find_by_id_number(RegistrationScope::Worker, "42")
            .await
            .unwrap();
        assert!(as_worker.is_none());
    }

    #[tokio::test]
    async fn unique_index_reports_duplicates() {
        let repo = repository().await;
        repo.create_record(RegistrationScope::Worker, registrant("12345678", Sector::ElVerso))
            .await
            .unwrap();

        let err = repo
            .create_record(RegistrationScope::Worker, registrant("12345678", Sector::ElVerso))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        assert_eq!(repo.list_workers().await.unwrap().len(), 1);
    }
}
