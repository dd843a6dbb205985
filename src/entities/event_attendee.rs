use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::sea_orm_active_enums::Sector;

/// Rows outlive their event: `event_id` carries no relation to `events`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "event_attendees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub id_number: String,
    pub phone: String,
    pub sector: Sector,
    pub photo_url: Option<String>,
    pub registered_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
