use httpmock::Method::{DELETE, GET, PATCH};
use httpmock::MockServer;
use serde_json::{json, Map, Value};

use super::models::{fields_to_json, json_to_fields};
use super::{Firestore, StoreError};

const BASE_PATH: &str = "/v1/projects/test-project/databases/(default)/documents";
// Same path with the parens escaped, for regex matchers.
const BASE_PATTERN: &str = r"/v1/projects/test-project/databases/\(default\)/documents";

fn store_for(server: &MockServer) -> Firestore {
    let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build();
    Firestore::from_client(client, server.url(BASE_PATH))
}

fn document_body(fields: Value, update_time: &str) -> Value {
    json!({
        "name": "projects/test-project/databases/(default)/documents/x/y",
        "fields": fields,
        "createTime": "2026-01-01T00:00:00Z",
        "updateTime": update_time,
    })
}

#[tokio::test]
async fn save_with_explicit_id_writes_at_that_id() {
    let server = MockServer::start();
    let store = store_for(&server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("{BASE_PATH}/logins/login-1"))
            .json_body_includes(r#"{ "fields": { "email": { "stringValue": "a@b.com" } } }"#);
        then.status(200).json_body(document_body(
            json!({ "email": { "stringValue": "a@b.com" } }),
            "2026-01-01T00:00:01Z",
        ));
    });

    let mut data = Map::new();
    data.insert("email".to_string(), json!("a@b.com"));

    let saved = store.save("logins", Some("login-1"), data).await.unwrap();
    assert_eq!(saved.id, "login-1");
    assert_eq!(saved.version, "2026-01-01T00:00:01Z");
    mock.assert();
}

#[tokio::test]
async fn save_without_id_generates_one_and_injects_it() {
    let server = MockServer::start();
    let store = store_for(&server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path_matches(format!("{BASE_PATTERN}/products/[0-9a-f-]{{36}}$").as_str())
            // The generated id must land in the document itself.
            .body_includes(r#""id":{"stringValue":""#);
        then.status(200)
            .json_body(document_body(json!({}), "2026-01-01T00:00:02Z"));
    });

    let mut data = Map::new();
    data.insert("name".to_string(), json!("Pen"));

    let saved = store.save("products", None, data).await.unwrap();
    assert_eq!(saved.id.len(), 36);
    assert_eq!(saved.version, "2026-01-01T00:00:02Z");
    mock.assert();
}

#[tokio::test]
async fn save_with_empty_id_also_generates_one() {
    let server = MockServer::start();
    let store = store_for(&server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path_matches(format!("{BASE_PATTERN}/products/[0-9a-f-]{{36}}$").as_str());
        then.status(200)
            .json_body(document_body(json!({}), "2026-01-01T00:00:03Z"));
    });

    let saved = store.save("products", Some(""), Map::new()).await.unwrap();
    assert_eq!(saved.id.len(), 36);
    mock.assert();
}

#[tokio::test]
async fn get_decodes_typed_fields_into_json() {
    let server = MockServer::start();
    let store = store_for(&server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{BASE_PATH}/products/p1"));
        then.status(200).json_body(document_body(
            json!({
                "id": { "stringValue": "p1" },
                "name": { "stringValue": "Pen" },
                "price": { "doubleValue": 1.5 },
                "stock": { "integerValue": "10" },
                "available": { "booleanValue": true },
                "meta": { "mapValue": { "fields": { "color": { "stringValue": "blue" } } } },
                "tags": { "arrayValue": { "values": [ { "stringValue": "office" } ] } }
            }),
            "2026-01-01T00:00:00Z",
        ));
    });

    let data = store.get("products", "p1").await.unwrap().unwrap();
    assert_eq!(data["id"], json!("p1"));
    assert_eq!(data["name"], json!("Pen"));
    assert_eq!(data["price"], json!(1.5));
    assert_eq!(data["stock"], json!(10));
    assert_eq!(data["available"], json!(true));
    assert_eq!(data["meta"], json!({ "color": "blue" }));
    assert_eq!(data["tags"], json!(["office"]));
}

#[tokio::test]
async fn get_missing_document_is_none() {
    let server = MockServer::start();
    let store = store_for(&server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{BASE_PATH}/products/ghost"));
        then.status(404).json_body(json!({
            "error": { "code": 404, "message": "Document not found.", "status": "NOT_FOUND" }
        }));
    });

    let result = store.get("products", "ghost").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn update_sends_mask_and_exists_precondition() {
    let server = MockServer::start();
    let store = store_for(&server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("{BASE_PATH}/products/p1"))
            .query_param("currentDocument.exists", "true")
            .query_param("updateMask.fieldPaths", "stock")
            .query_param("updateMask.fieldPaths", "id")
            .json_body_includes(r#"{ "fields": { "stock": { "integerValue": "5" } } }"#);
        then.status(200).json_body(document_body(
            json!({ "stock": { "integerValue": "5" } }),
            "2026-01-01T00:00:05Z",
        ));
    });

    let mut partial = Map::new();
    partial.insert("stock".to_string(), json!(5));

    let result = store.update("products", "p1", partial).await.unwrap();
    assert_eq!(result.update_time, "2026-01-01T00:00:05Z");
    mock.assert();
}

#[tokio::test]
async fn update_pins_id_from_the_path() {
    let server = MockServer::start();
    let store = store_for(&server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("{BASE_PATH}/products/p1"))
            // The caller tried to smuggle a different id in the body; the
            // path id must win.
            .json_body_includes(r#"{ "fields": { "id": { "stringValue": "p1" } } }"#);
        then.status(200)
            .json_body(document_body(json!({}), "2026-01-01T00:00:06Z"));
    });

    let mut partial = Map::new();
    partial.insert("id".to_string(), json!("other-id"));
    partial.insert("stock".to_string(), json!(7));

    store.update("products", "p1", partial).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn update_missing_document_is_not_found() {
    let server = MockServer::start();
    let store = store_for(&server);

    server.mock(|when, then| {
        when.method(PATCH).path(format!("{BASE_PATH}/products/ghost"));
        then.status(404).json_body(json!({
            "error": { "code": 404, "message": "No document to update", "status": "NOT_FOUND" }
        }));
    });

    let mut partial = Map::new();
    partial.insert("stock".to_string(), json!(5));

    let err = store.update("products", "ghost", partial).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert!(err.to_string().contains("products/ghost"));
}

#[tokio::test]
async fn delete_succeeds_for_any_id() {
    let server = MockServer::start();
    let store = store_for(&server);

    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path(format!("{BASE_PATH}/products/whatever"));
        then.status(200).json_body(json!({}));
    });

    store.delete("products", "whatever").await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn list_all_follows_pagination() {
    let server = MockServer::start();
    let store = store_for(&server);

    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{BASE_PATH}/products"))
            .query_param_missing("pageToken");
        then.status(200).json_body(json!({
            "documents": [
                {
                    "name": "projects/test-project/databases/(default)/documents/products/p1",
                    "fields": { "name": { "stringValue": "Pen" } },
                    "createTime": "2026-01-01T00:00:00Z",
                    "updateTime": "2026-01-01T00:00:00Z"
                }
            ],
            "nextPageToken": "page-2"
        }));
    });

    let second_page = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{BASE_PATH}/products"))
            .query_param("pageToken", "page-2");
        then.status(200).json_body(json!({
            "documents": [
                {
                    "name": "projects/test-project/databases/(default)/documents/products/p2",
                    "fields": { "name": { "stringValue": "Notebook" } },
                    "createTime": "2026-01-01T00:00:00Z",
                    "updateTime": "2026-01-01T00:00:00Z"
                }
            ]
        }));
    });

    let products = store.list_all("products").await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["name"], json!("Pen"));
    assert_eq!(products[1]["name"], json!("Notebook"));
    first_page.assert();
    second_page.assert();
}

#[tokio::test]
async fn list_all_of_empty_collection_is_empty() {
    let server = MockServer::start();
    let store = store_for(&server);

    // Firestore omits `documents` entirely for an empty collection.
    server.mock(|when, then| {
        when.method(GET).path(format!("{BASE_PATH}/products"));
        then.status(200).json_body(json!({}));
    });

    let products = store.list_all("products").await.unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn api_errors_carry_the_google_message() {
    let server = MockServer::start();
    let store = store_for(&server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{BASE_PATH}/products/p1"));
        then.status(403).json_body(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
        }));
    });

    let err = store.get("products", "p1").await.unwrap_err();
    assert!(matches!(err, StoreError::Api(_)));
    assert!(err.to_string().contains("insufficient permissions"));
}

#[test]
fn integers_cross_the_wire_as_strings() {
    let mut payload = Map::new();
    payload.insert("stock".to_string(), json!(10));
    payload.insert("price".to_string(), json!(1.5));

    let fields = json_to_fields(&payload).unwrap();
    assert_eq!(
        serde_json::to_value(&fields["stock"]).unwrap(),
        json!({ "integerValue": "10" })
    );
    assert_eq!(
        serde_json::to_value(&fields["price"]).unwrap(),
        json!({ "doubleValue": 1.5 })
    );
}

#[test]
fn nested_values_survive_encoding_and_decoding() {
    let mut payload = Map::new();
    payload.insert("name".to_string(), json!("Pen"));
    payload.insert("stock".to_string(), json!(10));
    payload.insert("tags".to_string(), json!(["office", "writing"]));
    payload.insert("meta".to_string(), json!({ "color": "blue", "weight": 12 }));
    payload.insert("note".to_string(), Value::Null);

    let fields = json_to_fields(&payload).unwrap();
    let back = fields_to_json(fields).unwrap();
    assert_eq!(Value::Object(back), Value::Object(payload));
}
