//! Static routes: liveness, health, placeholder user, product catalogue.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::llm::ModelMode;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: u32,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub model_mode: ModelMode,
    pub issue_source: String,
    pub log_failures: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
}

const PRODUCTS: [(u32, &str, &str); 5] = [
    (1, "Mobile Banking App", "Active"),
    (2, "Payment Gateway", "Active"),
    (3, "Customer Portal", "In Development"),
    (4, "Analytics Dashboard", "Active"),
    (5, "Loan Management System", "Planning"),
];

/// `GET /`: liveness text.
pub async fn root() -> &'static str {
    "Server is ready"
}

/// `GET /healthz`: liveness plus the operating mode of each collaborator.
pub async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        model_mode: state.model.mode(),
        issue_source: state.issues.name().to_string(),
        log_failures: state.chat_log.failures(),
    })
}

/// `GET /api/user`: placeholder profile until authentication exists.
pub async fn current_user() -> Json<UserProfile> {
    Json(UserProfile { id: 1, name: "Demo PM".into(), role: "Product Manager".into() })
}

/// `GET /api/products?q=`: catalogue, optionally filtered by name substring.
pub async fn list_products(Query(query): Query<ProductQuery>) -> Json<Vec<Product>> {
    Json(filter_products(query.q.as_deref()))
}

pub(crate) fn filter_products(query: Option<&str>) -> Vec<Product> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    PRODUCTS
        .iter()
        .filter(|(_, name, _)| name.to_lowercase().contains(&needle))
        .map(|&(id, name, status)| Product { id, name: name.to_string(), status: status.to_string() })
        .collect()
}
