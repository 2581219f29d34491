//! HTTP surface: routing, shared state, request handlers.
//!
//! # Route structure
//!
//! ```text
//! GET    /health                 - Liveness check
//!
//! POST   /firebase/test          - Store-connectivity probe
//! POST   /firebase/login         - Record a login event
//! GET    /firebase/user/{id}     - Fetch a recorded login event
//!
//! GET    /api/products           - List all products
//! POST   /api/products           - Create a product
//! GET    /api/products/{id}      - Fetch a product
//! PUT    /api/products/{id}      - Partially update a product
//! DELETE /api/products/{id}      - Delete a product
//! ```

pub mod error;
pub mod firebase;
pub mod products;


use axum::routing::get;
use axum::Router;

use crate::store::Firestore;

/// State shared across all handlers. Cheap to clone per request; the client
/// is constructed once at startup and handed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub store: Firestore,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/firebase", firebase::routes())
        .nest("/api/products", products::routes())
        .with_state(state)
}

/// Liveness check. Does not touch the store.
async fn health() -> &'static str {
    "ok"
}
