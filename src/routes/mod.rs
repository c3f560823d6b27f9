pub mod cowork_session;
pub mod error;
pub mod events;
pub mod health;
pub mod notification;
pub mod profile;
pub mod sprint;
pub mod user;
pub mod venue;
