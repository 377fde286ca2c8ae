//! Request handlers.

pub mod chat;
pub mod health;
pub mod messages;
pub mod page;
