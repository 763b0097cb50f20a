#![allow(clippy::bool_comparison)]

pub mod application;
pub mod broker;
pub mod chats;
pub mod routes;
