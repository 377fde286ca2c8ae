//! LawBot web server binary.
//!
//! Serves the chat page and JSON API, backed by PostgreSQL (or an in-memory
//! history with `--in-memory`).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use lawbot_api::config::ApiConfig;
use lawbot_core::completion::{CompletionSettings, DEFAULT_SYSTEM_PROMPT};
use lawbot_core::history::{HistoryStore, MemoryHistoryStore, PgHistoryStore};

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "lawbot_server", about = "LawBot web chat server")]
struct Args {
    /// Address to bind the HTTP listener.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:9000")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/lawbot"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep history in process memory instead of PostgreSQL. Lost on exit.
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Completion API key. Without it the chat reports "not configured".
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Override the completion API base URL.
    #[arg(long, env = "COMPLETION_BASE_URL")]
    completion_base_url: Option<String>,

    /// Override the completion model.
    #[arg(long, env = "COMPLETION_MODEL")]
    model: Option<String>,

    /// System prompt sent ahead of each message.
    #[arg(long, env = "SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    system_prompt: String,

    /// Whole-request timeout for completion calls, in seconds.
    #[arg(long, env = "COMPLETION_TIMEOUT_SECS", default_value_t = 30)]
    completion_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lawbot_api=debug,lawbot_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    info!(bind_addr = %args.bind_addr, in_memory = args.in_memory, "starting lawbot_server");

    let history: Arc<dyn HistoryStore> = if args.in_memory {
        warn!("using in-memory history; records are lost on exit");
        Arc::new(MemoryHistoryStore::new())
    } else {
        info!(
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&args.database_url)
            .await?;

        info!("running database migrations");
        lawbot_api::migrate(&pool).await?;

        Arc::new(PgHistoryStore::new(pool))
    };

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        database_url: args.database_url,
        completion: CompletionSettings {
            api_key: args.openai_api_key,
            base_url: args.completion_base_url,
            model: args.model,
            system_prompt: args.system_prompt,
            timeout: Duration::from_secs(args.completion_timeout_secs),
            ..Default::default()
        },
    };

    if !config.completion.is_configured() {
        warn!("OPENAI_API_KEY is not set; chat requests will report the API as not configured");
    }

    let state = lawbot_api::AppState::new(history, config.clone())?;
    let app = lawbot_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
