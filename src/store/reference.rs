//! Collection and document references, mirroring the Firestore SDK shape.
//!
//! A reference is a path plus a borrowed client; operations on it translate
//! directly to single REST calls against the documents endpoint.

use reqwest::{header, StatusCode};
use reqwest_middleware::ClientWithMiddleware;

use super::models::{fields_to_json, json_to_fields, Document, JsonMap, ListDocumentsResponse};
use super::{parse_error_response, StoreError};

const LIST_PAGE_SIZE: &str = "300";

/// The store's acknowledgment of a write. `update_time` doubles as the
/// opaque version token handed back to API clients.
#[derive(Debug, Clone)]
pub struct WriteResult {
    pub update_time: String,
}

#[derive(Clone)]
pub struct CollectionReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
}

impl<'a> CollectionReference<'a> {
    /// Gets a [`DocumentReference`] for `document_id` within this collection.
    pub fn doc(&self, document_id: &str) -> DocumentReference<'a> {
        DocumentReference {
            client: self.client,
            path: format!("{}/{}", self.path, document_id),
        }
    }

    /// Fetches the fields of every document in the collection, following
    /// `nextPageToken` pagination until the store reports no further pages.
    /// The result is fully materialized.
    pub async fn list(&self) -> Result<Vec<JsonMap>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&self.path)
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(token) = page_token.take() {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(StoreError::Api(
                    parse_error_response(response, "list documents failed").await,
                ));
            }

            let page: ListDocumentsResponse = response.json().await?;
            for doc in page.documents {
                documents.push(fields_to_json(doc.fields)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }
}

#[derive(Clone)]
pub struct DocumentReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
}

impl DocumentReference<'_> {
    /// Reads the document. A missing document is `Ok(None)`, never an error.
    pub async fn get(&self) -> Result<Option<JsonMap>, StoreError> {
        let response = self.client.get(&self.path).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Api(
                parse_error_response(response, "get document failed").await,
            ));
        }

        let doc: Document = response.json().await?;
        Ok(Some(fields_to_json(doc.fields)?))
    }

    /// Creates or overwrites the document with `data`.
    pub async fn set(&self, data: &JsonMap) -> Result<WriteResult, StoreError> {
        let fields = json_to_fields(data)?;
        let body = serde_json::to_vec(&serde_json::json!({ "fields": fields }))?;

        let response = self
            .client
            .patch(&self.path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Api(
                parse_error_response(response, "set document failed").await,
            ));
        }

        let doc: Document = response.json().await?;
        Ok(WriteResult {
            update_time: doc.update_time,
        })
    }

    /// Merges exactly the fields named in `mask` into the document; fields
    /// outside the mask are untouched. Requires the document to exist —
    /// Firestore rejects the write with NOT_FOUND otherwise, surfaced here
    /// as [`StoreError::NotFound`].
    pub async fn update(&self, data: &JsonMap, mask: &[String]) -> Result<WriteResult, StoreError> {
        let fields = json_to_fields(data)?;
        let body = serde_json::to_vec(&serde_json::json!({ "fields": fields }))?;

        let mut query: Vec<(&str, &str)> = vec![("currentDocument.exists", "true")];
        for field in mask {
            query.push(("updateMask.fieldPaths", field.as_str()));
        }

        let response = self
            .client
            .patch(&self.path)
            .query(&query)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                path: self.doc_path(),
            });
        }
        if !response.status().is_success() {
            return Err(StoreError::Api(
                parse_error_response(response, "update document failed").await,
            ));
        }

        let doc: Document = response.json().await?;
        Ok(WriteResult {
            update_time: doc.update_time,
        })
    }

    /// Deletes the document. Firestore acknowledges deletion of a missing id
    /// as a success, which keeps this idempotent.
    pub async fn delete(&self) -> Result<(), StoreError> {
        let response = self.client.delete(&self.path).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Api(
                parse_error_response(response, "delete document failed").await,
            ));
        }

        Ok(())
    }

    /// The trailing `collection/id` portion of the full resource path.
    fn doc_path(&self) -> String {
        let mut segments = self.path.rsplit('/');
        let id = segments.next().unwrap_or_default();
        let collection = segments.next().unwrap_or_default();
        format!("{collection}/{id}")
    }
}
