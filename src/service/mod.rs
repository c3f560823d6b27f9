pub mod email;
pub mod sprint;
pub mod timer;
