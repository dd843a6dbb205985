use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create ElectoralWorkers Table
        let table = Table::create()
            .table(ElectoralWorkers::Table)
            .if_not_exists()
            .col(pk_uuid(ElectoralWorkers::Id))
            .col(string(ElectoralWorkers::Name))
            .col(string_len(ElectoralWorkers::IdNumber, 32))
            .col(string(ElectoralWorkers::Phone))
            .col(string_len(ElectoralWorkers::Sector, 32))
            .col(string_null(ElectoralWorkers::PhotoUrl))
            .col(timestamp_with_time_zone(ElectoralWorkers::RegisteredAt))
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_electoral_workers_id_number")
                    .table(ElectoralWorkers::Table)
                    .col(ElectoralWorkers::IdNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create EventAttendees Table
        //
        // No foreign key to events: deleting an event leaves its attendees
        // in place unless the application removes them explicitly.
        let table = Table::create()
            .table(EventAttendees::Table)
            .if_not_exists()
            .col(pk_uuid(EventAttendees::Id))
            .col(uuid(EventAttendees::EventId))
            .col(string(EventAttendees::Name))
            .col(string_len(EventAttendees::IdNumber, 32))
            .col(string(EventAttendees::Phone))
            .col(string_len(EventAttendees::Sector, 32))
            .col(string_null(EventAttendees::PhotoUrl))
            .col(timestamp_with_time_zone(EventAttendees::RegisteredAt))
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_event_attendees_event_id_number")
                    .table(EventAttendees::Table)
                    .col(EventAttendees::EventId)
                    .col(EventAttendees::IdNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventAttendees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ElectoralWorkers::Table).to_owned())
            .await?;

        Ok(())
    }
}
