//! # lawbot_core
//!
//! Core domain logic for LawBot: the chat record model, the history store,
//! and the completion API client.

pub mod completion;
pub mod history;
pub mod migrate;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
