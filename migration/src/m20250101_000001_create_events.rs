use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Events::Table)
            .if_not_exists()
            .col(pk_uuid(Events::Id))
            .col(string(Events::Title))
            .col(date(Events::Date))
            .col(time(Events::Time))
            .col(string(Events::Location))
            .col(string(Events::Leader))
            .col(string_len(Events::Kind, 32))
            .col(timestamp_with_time_zone(Events::CreatedAt))
            .to_owned();
        manager.create_table(table).await?;

        // The dashboard lists newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_events_created_at")
                    .table(Events::Table)
                    .col(Events::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        Ok(())
    }
}
