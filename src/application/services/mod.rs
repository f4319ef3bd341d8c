pub mod collection;
pub mod edit_session;
pub mod event_bus;
