//! Request middleware.

pub mod request_log;
