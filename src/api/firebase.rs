//! Handlers for the `/firebase` routes: connectivity probe, login-event
//! recording, and login-event lookup.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::instrument;

use super::error::{ApiError, Result};
use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test", post(test_connection))
        .route("/login", post(login))
        .route("/user/{login_id}", get(get_user))
}

/// Writes the posted payload to `test_connection` with an injected server
/// timestamp. Proves credentials and store connectivity end to end.
#[instrument(skip_all)]
async fn test_connection(
    State(state): State<AppState>,
    Json(mut data): Json<Map<String, Value>>,
) -> Result<Json<Value>> {
    data.insert("timestamp".to_string(), json!(Utc::now().timestamp_millis()));

    let saved = state.store.save("test_connection", None, data).await?;

    Ok(Json(json!({
        "status": "success",
        "id": saved.id,
        "timestamp": saved.version,
    })))
}

/// Records a login event in `logins`. Both `email` and `password` must be
/// present; the password itself is never persisted. The stored event is
/// write-once — nothing in this service updates or deletes it.
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>> {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);

    let (Some(email), Some(_)) = (email, password) else {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    };

    let mut event = Map::new();
    event.insert("email".to_string(), json!(email));
    event.insert("timestamp".to_string(), json!(Utc::now().timestamp_millis()));
    event.insert("success".to_string(), json!(true));
    if let Some(info) = body.get("additionalInfo") {
        event.insert("additionalInfo".to_string(), info.clone());
    }

    let saved = state.store.save("logins", None, event).await?;
    tracing::info!(login_id = %saved.id, "login event recorded");

    Ok(Json(json!({
        "success": true,
        "message": "login recorded",
        "loginId": saved.id,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// Looks up a recorded login event by id.
#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    Path(login_id): Path<String>,
) -> Result<Json<Map<String, Value>>> {
    match state.store.get("logins", &login_id).await? {
        Some(data) => Ok(Json(data)),
        None => Err(ApiError::NotFound(format!("login {login_id}"))),
    }
}
