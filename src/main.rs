mod config;
mod db;
mod error;
mod issues;
mod llm;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use llm::{ModelChat, ModelClient};
use services::chat_log::{ChatLogger, ConversationStore, MemoryConversationStore, PgConversationStore};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let issues = issues::from_config(config.issue_source.clone()).expect("issue source init failed");
    tracing::info!(source = issues.name(), "issue source initialized");

    // Model client is non-fatal without a key: it runs in placeholder mode.
    let model = ModelClient::from_env().expect("model client init failed");
    match model.mode() {
        llm::ModelMode::Live => tracing::info!(model = model.model(), "model client live"),
        llm::ModelMode::Placeholder => {
            tracing::warn!("no model credential configured; replies use placeholder mode");
        }
    }

    let store: Arc<dyn ConversationStore> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            Arc::new(PgConversationStore::new(pool))
        }
        None => {
            tracing::warn!(
                max_entries = config.memory_log_max_entries,
                "DATABASE_URL not set; chat log kept in memory, oldest entries evicted past max_entries"
            );
            Arc::new(MemoryConversationStore::with_max_entries(config.memory_log_max_entries))
        }
    };
    let chat_log = ChatLogger::spawn(store, config.chat_log_queue_capacity);

    let state = state::AppState::new(issues, Arc::new(model), chat_log);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "jiramate listening");
    axum::serve(listener, app).await.expect("server failed");
}
