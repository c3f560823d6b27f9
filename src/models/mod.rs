pub mod cowork_session;
pub mod login_session;
pub mod notification;
pub mod participation;
pub mod profile;
pub mod reaction;
pub mod sprint;
pub mod user;
pub mod venue;
