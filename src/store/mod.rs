//! Store adapter over the Cloud Firestore REST API.
//!
//! Wraps Firestore behind a uniform CRUD contract keyed by collection name
//! and document id: [`Firestore::save`], [`Firestore::get`],
//! [`Firestore::update`], [`Firestore::delete`] and [`Firestore::list_all`].
//! Requests carry an OAuth2 bearer token injected by
//! [`auth::GoogleAuthMiddleware`]. The client applies a bounded request
//! timeout and never retries on its own; a failed request surfaces
//! immediately as a [`StoreError`].

pub mod auth;
pub mod models;
pub mod reference;

#[cfg(test)]
mod tests;

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;
use yup_oauth2::ServiceAccountKey;

use self::auth::GoogleAuthMiddleware;
use self::models::JsonMap;
use self::reference::{CollectionReference, WriteResult};

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

/// Errors from the document-store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The target of a partial update does not exist. Reads signal absence
    /// through `Option` instead; only writes that require an existing
    /// document produce this.
    #[error("document {path} does not exist")]
    NotFound { path: String },
    /// Wrapper for `reqwest_middleware::Error` (includes token acquisition
    /// failures).
    #[error("middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success response from the Firestore API.
    #[error("Firestore API error: {0}")]
    Api(String),
    /// Wrapper for `serde_json::Error`.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A successful [`Firestore::save`]: the id the document was written under
/// and the store's version token for the write.
#[derive(Debug, Clone)]
pub struct SavedDocument {
    pub id: String,
    pub version: String,
}

/// Client for the Firestore document store.
#[derive(Clone)]
pub struct Firestore {
    client: ClientWithMiddleware,
    base_url: String,
}

impl Firestore {
    /// Creates a client for the project named in the service-account key.
    ///
    /// # Arguments
    ///
    /// * `key` - The service-account key; its `project_id` selects the
    ///   database.
    /// * `timeout` - Per-request timeout applied to every store round-trip.
    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self, StoreError> {
        let project_id = key.project_id.clone().unwrap_or_default();
        let base_url = FIRESTORE_V1_API.replace("{project_id}", &project_id);
        Self::with_base_url(key, base_url, timeout)
    }

    /// Creates a client against a custom documents endpoint (Firestore
    /// emulator support).
    pub fn with_base_url(
        key: ServiceAccountKey,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = ClientBuilder::new(Client::builder().timeout(timeout).build()?)
            .with(GoogleAuthMiddleware::new(key))
            .build();

        Ok(Self { client, base_url })
    }

    #[cfg(test)]
    pub(crate) fn from_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Gets a [`CollectionReference`] for the collection at `collection_id`.
    pub fn collection(&self, collection_id: &str) -> CollectionReference<'_> {
        CollectionReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, collection_id),
        }
    }

    /// Writes `data` to `collection`.
    ///
    /// When `id` is absent or empty, a fresh identifier is generated and
    /// injected into `data["id"]` before the write, so the stored document
    /// always carries its own id. Returns the id actually written and the
    /// store's version token.
    pub async fn save(
        &self,
        collection: &str,
        id: Option<&str>,
        mut data: JsonMap,
    ) -> Result<SavedDocument, StoreError> {
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let generated = Uuid::new_v4().to_string();
                data.insert("id".to_string(), serde_json::Value::String(generated.clone()));
                generated
            }
        };

        let result = self.collection(collection).doc(&id).set(&data).await?;

        Ok(SavedDocument {
            id,
            version: result.update_time,
        })
    }

    /// Reads a document. A missing document is `Ok(None)`, never an error.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<JsonMap>, StoreError> {
        self.collection(collection).doc(id).get().await
    }

    /// Merge-style partial write: fields present in `partial` overwrite the
    /// corresponding stored fields, absent fields stay untouched.
    ///
    /// The document id is pinned from the path parameter, overriding any id
    /// the caller put in the body. Updating a document that does not exist
    /// fails with [`StoreError::NotFound`] rather than creating it.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        mut partial: JsonMap,
    ) -> Result<WriteResult, StoreError> {
        partial.insert("id".to_string(), serde_json::Value::String(id.to_string()));
        let mask: Vec<String> = partial.keys().cloned().collect();

        self.collection(collection).doc(id).update(&partial, &mask).await
    }

    /// Deletes a document. Deleting an id that does not exist succeeds, so
    /// the operation is idempotent.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.collection(collection).doc(id).delete().await
    }

    /// Returns the fields of every document in `collection`, materialized.
    /// Order is whatever the store returns.
    pub async fn list_all(&self, collection: &str) -> Result<Vec<JsonMap>, StoreError> {
        self.collection(collection).list().await
    }
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetails {
    code: u16,
    message: String,
    #[allow(dead_code)]
    status: Option<String>,
}

/// Extracts a readable message from a Google API error response, falling
/// back to the HTTP status when the body is not the standard error shape.
pub(crate) async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    match response.json::<GoogleErrorBody>().await {
        Ok(body) => format!("{} (code: {})", body.error.message, body.error.code),
        Err(_) => format!("{default_msg}: {status}"),
    }
}
