mod get_messages;
mod send_message;

pub use get_messages::get_messages;
pub use send_message::send_message;
