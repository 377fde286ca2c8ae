//! # lawbot_api
//!
//! HTTP API library for LawBot.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, header};
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use lawbot_core::completion::{CompletionClient, CompletionError};
use lawbot_core::history::HistoryStore;

use crate::config::ApiConfig;
use crate::handlers::{chat, health, messages, page};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Chat history store.
    pub history: Arc<dyn HistoryStore>,
    /// Completion API client.
    pub completion: CompletionClient,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the completion client from `config` and bundles it with the store.
    pub fn new(history: Arc<dyn HistoryStore>, config: ApiConfig) -> Result<Self, CompletionError> {
        let completion = CompletionClient::new(config.completion.clone())?;
        Ok(Self {
            history,
            completion,
            config,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `lawbot_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    lawbot_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let pages = Router::new().route("/", get(page::chat_page).post(page::submit_chat_form));

    let api = Router::new()
        .route("/api/chat/", post(chat::chat_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/messages/", get(messages::list_messages_handler))
        .route("/api/messages", get(messages::list_messages_handler))
        .route("/api/messages/{id}", get(messages::get_message_handler))
        .route("/api/health", get(health::health_handler));

    Router::new()
        .merge(pages)
        .merge(api)
        .layer(cors)
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(header::X_FRAME_OPTIONS, "DENY"))
        .layer(security_header(
            header::REFERRER_POLICY,
            "strict-origin-when-cross-origin",
        ))
        .layer(security_header(
            header::CONTENT_SECURITY_POLICY,
            "default-src 'self'; style-src 'self' 'unsafe-inline'",
        ))
        .layer(axum::middleware::from_fn(middleware::request_log::log_requests))
        .with_state(state)
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}
