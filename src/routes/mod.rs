//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the HTTP surface used by the JiraMate front end. All routes share
//! one `AppState`; CORS is open because the UI is served from another origin.

pub mod catalog;
pub mod chat;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(catalog::root))
        .route("/healthz", get(catalog::healthz))
        .route("/api/user", get(catalog::current_user))
        .route("/api/products", get(catalog::list_products))
        .route("/api/chat", post(chat::post_chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
