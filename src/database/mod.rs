pub mod cowork_session;
pub mod login_session;
pub mod magic_link;
pub mod notification;
pub mod participation;
pub mod postgres_repository;
pub mod profile;
pub mod sprint;
pub mod user;
pub mod venue;
