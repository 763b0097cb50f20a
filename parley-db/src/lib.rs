pub mod memory;
pub mod messages;
pub mod users;
