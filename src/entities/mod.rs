pub mod prelude;

pub mod electoral_worker;
pub mod event;
pub mod event_attendee;
pub mod sea_orm_active_enums;
