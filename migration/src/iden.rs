use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Events {
    Table,
    Id,
    Title,
    Date,
    Time,
    Location,
    Leader,
    #[sea_orm(iden = "type")]
    Kind,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ElectoralWorkers {
    Table,
    Id,
    Name,
    IdNumber,
    Phone,
    Sector,
    PhotoUrl,
    RegisteredAt,
}

#[derive(DeriveIden)]
pub enum EventAttendees {
    Table,
    Id,
    EventId,
    Name,
    IdNumber,
    Phone,
    Sector,
    PhotoUrl,
    RegisteredAt,
}
