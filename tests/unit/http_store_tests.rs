/*!
 * Tests for the HTTP blob store against a local mock server
 */

use bytes::Bytes;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doclingo::errors::StoreError;
use doclingo::storage::{BlobStore, HttpBlobStore, MARKDOWN_CONTENT_TYPE};

const KEY: &str = "translations/menu/fr/1688ddc51f243a91.md";
const OBJECT_PATH: &str = "/bucket/translations/menu/fr/1688ddc51f243a91.md";

fn store_for(server: &MockServer, token: Option<&str>) -> HttpBlobStore {
    let base_url = format!("{}/bucket", server.uri());
    HttpBlobStore::new(&base_url, token.map(str::to_string), 5).unwrap()
}

async fn respond_to_get(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(server)
        .await;
}

/// Test that a stored object is returned with the bearer token sent
#[tokio::test]
async fn test_get_withExistingObject_shouldReturnBody() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OBJECT_PATH))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Bonjour"))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, Some("secret"));

    assert_eq!(store.get(KEY).await.unwrap(), Some(Bytes::from_static(b"Bonjour")));
}

/// Test that 404 is a miss, not a failure
#[tokio::test]
async fn test_get_withNotFound_shouldReturnNone() {
    let server = MockServer::start().await;
    respond_to_get(&server, 404).await;

    let store = store_for(&server, None);

    assert!(store.get(KEY).await.unwrap().is_none());
}

/// Test that 401 and 403 are permission failures
#[tokio::test]
async fn test_get_withUnauthorizedOrForbidden_shouldBePermissionDenied() {
    for status in [401, 403] {
        let server = MockServer::start().await;
        respond_to_get(&server, status).await;

        let error = store_for(&server, Some("stale")).get(KEY).await.unwrap_err();

        assert!(
            matches!(error, StoreError::PermissionDenied { ref key, .. } if key == KEY),
            "status {} gave {:?}",
            status,
            error
        );
    }
}

/// Test that other error statuses are backend failures
#[tokio::test]
async fn test_get_withServerError_shouldBeBackend() {
    for status in [400, 500, 503] {
        let server = MockServer::start().await;
        respond_to_get(&server, status).await;

        let error = store_for(&server, None).get(KEY).await.unwrap_err();

        assert!(matches!(error, StoreError::Backend(_)), "status {} gave {:?}", status, error);
    }
}

/// Test that a closed port is reported as unreachable
#[tokio::test]
async fn test_get_withNoServer_shouldBeUnreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpBlobStore::new(&format!("http://{}/bucket", address), None, 5).unwrap();

    assert!(matches!(store.get(KEY).await, Err(StoreError::Unreachable(_))));
}

/// Test that uploads carry the content type and body
#[tokio::test]
async fn test_put_shouldSendContentTypeAndBody() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(OBJECT_PATH))
        .and(header("content-type", MARKDOWN_CONTENT_TYPE))
        .and(body_string("Bonjour"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);

    store
        .put(KEY, Bytes::from_static(b"Bonjour"), MARKDOWN_CONTENT_TYPE)
        .await
        .unwrap();
}

/// Test that rejected uploads map onto the store errors
#[tokio::test]
async fn test_put_withErrorStatus_shouldMapToStoreError() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let store = store_for(&server, None);
    let error = store
        .put(KEY, Bytes::from_static(b"Bonjour"), MARKDOWN_CONTENT_TYPE)
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::PermissionDenied { .. }));

    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(OBJECT_PATH))
        .respond_with(ResponseTemplate::new(507))
        .mount(&server)
        .await;
    let store = store_for(&server, None);
    let error = store
        .put(KEY, Bytes::from_static(b"Bonjour"), MARKDOWN_CONTENT_TYPE)
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::Backend(_)));
}
