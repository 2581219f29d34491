//! Handlers for the `/api/products` CRUD routes.
//!
//! Each handler is one linear validate → delegate → respond sequence; all
//! branching beyond that lives in the validation module and the store.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tracing::instrument;

use super::error::{ApiError, Result};
use super::AppState;
use crate::validation::{validate_create, validate_update};

const COLLECTION: &str = "products";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

/// Lists every product. Order is whatever the store returns.
#[instrument(skip_all)]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Map<String, Value>>>> {
    let products = state.store.list_all(COLLECTION).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Map<String, Value>>> {
    match state.store.get(COLLECTION, &id).await? {
        Some(product) => Ok(Json(product)),
        None => Err(ApiError::NotFound(format!("product {id}"))),
    }
}

/// Creates a product after validating the full payload. The store assigns
/// the id; the response echoes it with the write's version token.
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>> {
    validate_create(&payload)?;

    let saved = state.store.save(COLLECTION, None, payload).await?;
    tracing::info!(product_id = %saved.id, "product created");

    Ok(Json(json!({
        "success": true,
        "productId": saved.id,
        "timestamp": saved.version,
    })))
}

/// Applies a partial update. Only the supplied fields are validated and
/// written; the id always comes from the path, never the body.
#[instrument(skip(state, payload))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>> {
    validate_update(&payload)?;

    let result = state.store.update(COLLECTION, &id, payload).await?;

    Ok(Json(json!({
        "success": true,
        "timestamp": result.update_time,
    })))
}

/// Deletes a product. Deleting an unknown id still reports success — the
/// store treats the operation as idempotent.
#[instrument(skip(state))]
async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    state.store.delete(COLLECTION, &id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "product deleted",
    })))
}
