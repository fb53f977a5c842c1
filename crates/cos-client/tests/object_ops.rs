//! Integration tests for single-shot object and directory operations,
//! driven against a mock service.

use std::io::Write;

use cos_client::{
    Authority, ClientError, Config, CosClient, Credentials, CustomHeaders, ListOptions,
};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_ID: &str = "20001234";
const BUCKET: &str = "testbucket";

async fn client_for(server: &MockServer) -> CosClient {
    let credentials = Credentials::new("sh", APP_ID, "secret-id", "secret-key").unwrap();
    let config = Config::new(format!("{}/files/v2/", server.uri()));
    CosClient::new(credentials, config).unwrap()
}

fn resource(pathname: &str) -> String {
    format!("/files/v2/{}/{}{}", APP_ID, BUCKET, pathname)
}

#[tokio::test]
async fn stat_object_decodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(resource("/photos/cat.jpg")))
        .and(query_param("op", "stat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "message": "SUCCESS",
            "data": {
                "name": "cat.jpg",
                "filesize": 4096,
                "filelen": 4096,
                "sha": "da39a3ee",
                "access_url": "http://cos.example/photos/cat.jpg"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let stat = client.stat_object(BUCKET, "photos/cat.jpg").await.unwrap();
    assert_eq!(stat.filesize, Some(4096));
    assert_eq!(stat.access_url.as_deref(), Some("http://cos.example/photos/cat.jpg"));
}

#[tokio::test]
async fn requests_carry_an_authorization_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 0})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.stat_object(BUCKET, "a.txt").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert!(!auth.to_str().unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_object_surfaces_remote_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"op\":\"delete\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": -166,
            "message": "file not exist",
            "request_id": "req-del-1"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.delete_object(BUCKET, "ghost.txt").await.unwrap_err();
    match err {
        ClientError::Api {
            code,
            message,
            request_id,
        } => {
            assert_eq!(code, -166);
            assert_eq!(message, "file not exist");
            assert_eq!(request_id.as_deref(), Some("req-del-1"));
        }
        other => panic!("expected a remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn whole_upload_below_threshold_is_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "message": "SUCCESS",
            "data": {
                "access_url": "http://cos.example/small.bin",
                "resource_path": "/20001234/testbucket/small.bin",
                "source_url": "http://src.example/small.bin"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut src = tempfile::NamedTempFile::new().unwrap();
    src.write_all(&vec![b'a'; 10 * 1024]).unwrap();

    let client = client_for(&server).await;
    let data = client
        .upload_object(BUCKET, src.path(), "small.bin", "", false)
        .await
        .unwrap();
    assert_eq!(data.access_url, "http://cos.example/small.bin");

    // One whole-file request: no session negotiated, hash and insert-only
    // flag on the form.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"sha\""));
    assert!(body.contains("name=\"insertOnly\""));
    assert!(!body.contains("name=\"session\""));
}

#[tokio::test]
async fn copy_sends_destination_and_overwrite_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(resource("/src.txt")))
        .and(body_string_contains("\"op\":\"copy\""))
        .and(body_string_contains("\"dest_fileid\":\"/dst.txt\""))
        .and(body_string_contains("\"to_over_write\":1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .copy_object(BUCKET, "src.txt", "dst.txt", true)
        .await
        .unwrap();
}

#[tokio::test]
async fn move_uses_single_use_signature_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"op\":\"move\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 0})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.move_object(BUCKET, "a.txt", "b.txt", false).await.unwrap();
    client.move_object(BUCKET, "a.txt", "b.txt", false).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let first = requests[0].headers.get("authorization").unwrap();
    let second = requests[1].headers.get("authorization").unwrap();
    assert_ne!(first, second, "single-use tokens must differ per call");
}

#[tokio::test]
async fn update_object_sends_filtered_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"op\":\"update\""))
        .and(body_string_contains("\"authority\":\"eWPrivateRPublic\""))
        .and(body_string_contains("\"Content-Type\":\"image/png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let headers = CustomHeaders::new()
        .with("Content-Type", "image/png")
        .with("Host", "evil.example");
    client
        .update_object(
            BUCKET,
            "photos/cat.jpg",
            Some("tagged"),
            Some(Authority::PrivateWritePublicRead),
            headers,
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("evil.example"), "disallowed header must be dropped");
}

#[tokio::test]
async fn directory_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(resource("/albums/")))
        .and(body_string_contains("\"op\":\"create\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "data": {"ctime": 1700000000i64, "resource_path": "/20001234/testbucket/albums/"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(resource("/albums/")))
        .and(query_param("op", "list"))
        .and(query_param("num", "20"))
        .and(query_param("pattern", "eListBoth"))
        .and(query_param("order", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "data": {
                "context": "",
                "has_more": false,
                "dircount": 1,
                "filecount": 1,
                "infos": [
                    {"name": "2024/"},
                    {"name": "cover.jpg", "filesize": 2048, "sha": "aa"}
                ]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(resource("/albums/")))
        .and(body_string_contains("\"op\":\"delete\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 0})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let created = client.create_directory(BUCKET, "albums", "").await.unwrap();
    assert_eq!(created.resource_path, "/20001234/testbucket/albums/");

    let listing = client
        .list_directory(BUCKET, "albums", ListOptions::default())
        .await
        .unwrap();
    assert_eq!(listing.infos.len(), 2);
    assert!(listing.infos[0].is_directory());
    assert!(!listing.infos[1].is_directory());

    client.remove_directory(BUCKET, "albums").await.unwrap();
}

#[tokio::test]
async fn unparseable_body_is_a_network_class_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.stat_object(BUCKET, "a.txt").await.unwrap_err();
    match err {
        ClientError::InvalidResponse(body) => {
            assert!(body.contains("bad gateway"), "original body kept for diagnostics");
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
    assert_eq!(
        client.stat_object(BUCKET, "a.txt").await.unwrap_err().code(),
        cos_client::code::NETWORK_ERROR
    );
}
