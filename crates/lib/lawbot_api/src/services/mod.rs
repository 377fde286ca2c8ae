//! Operations shared by the JSON and HTML handlers.

pub mod chat;
