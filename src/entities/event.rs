use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::sea_orm_active_enums::EventKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub date: Date,
    pub time: Time,
    pub location: String,
    pub leader: String,
    #[sea_orm(column_name = "type")]
    pub kind: EventKind,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
