pub use super::electoral_worker::Entity as ElectoralWorker;
pub use super::event::Entity as Event;
pub use super::event_attendee::Entity as EventAttendee;
