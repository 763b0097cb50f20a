mod service;

pub use service::{
    message_to_dto, messages_to_dto, ChatError, ChatService, GetMessagesCmd, SendMessageCmd,
};
