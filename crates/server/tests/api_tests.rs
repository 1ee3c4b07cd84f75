use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use linkvault_blob::{BlobStore, MemoryBlobStore};
use linkvault_core::{Argon2Hasher, Clock, ManualClock};
use linkvault_engine::DropEngineBuilder;
use linkvault_server::api::AppState;
use linkvault_store::DropStore;
use linkvault_store_memory::MemoryDropStore;

const BOUNDARY: &str = "linkvault-test-boundary";
const PUBLIC_URL: &str = "https://vault.test";
const MAX_UPLOAD_BYTES: usize = 64 * 1024;

// -- Helpers --------------------------------------------------------------

struct TestApp {
    app: axum::Router,
    blobs: Arc<MemoryBlobStore>,
    store: Arc<MemoryDropStore>,
    clock: Arc<ManualClock>,
}

fn build_app() -> TestApp {
    let store = Arc::new(MemoryDropStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::default());

    let engine = DropEngineBuilder::new()
        .store(Arc::clone(&store) as Arc<dyn DropStore>)
        .blobs(Arc::clone(&blobs) as Arc<dyn BlobStore>)
        .hasher(Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()))
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build()
        .expect("engine should build");

    let state = AppState {
        engine,
        public_url: PUBLIC_URL.to_owned(),
        max_upload_bytes: MAX_UPLOAD_BYTES,
    };

    TestApp {
        app: linkvault_server::api::router(state),
        blobs,
        store,
        clock,
    }
}

enum Part<'a> {
    Field(&'a str, &'a str),
    File {
        name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Field(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    let body = multipart_body(parts);
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete_request(id: &str, token: &str) -> Request<Body> {
    let body = serde_json::json!({ "shortId": id, "deleteToken": token });
    Request::builder()
        .method("POST")
        .uri("/api/delete")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn upload_text(app: &axum::Router, extra: Vec<Part<'_>>) -> Value {
    let mut parts = vec![
        Part::Field("type", "text"),
        Part::Field("textContent", "hello from the vault"),
    ];
    parts.extend(extra);
    let (status, body) = send(app, upload_request(&parts)).await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {body}");
    body
}

// -- Health ---------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let t = build_app();
    let (status, body) = send(&t.app, get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["metrics"]["created"], 0);
}

#[tokio::test]
async fn metrics_reflect_activity() {
    let t = build_app();
    let created = upload_text(&t.app, vec![]).await;
    let id = created["id"].as_str().unwrap();
    send(&t.app, get_request(&format!("/api/{id}"))).await;
    send(&t.app, get_request("/api/zzzzzzzz")).await;

    let (status, body) = send(&t.app, get_request("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 1);
    assert_eq!(body["retrieved"], 1);
}

// -- Upload & retrieve ----------------------------------------------------

#[tokio::test]
async fn upload_text_then_retrieve() {
    let t = build_app();
    let created = upload_text(&t.app, vec![Part::Field("expiresInMinutes", "30")]).await;

    assert_eq!(created["success"], true);
    let id = created["id"].as_str().unwrap();
    assert_eq!(id.len(), 8);
    assert_eq!(created["link"], format!("{PUBLIC_URL}/{id}"));
    assert!(created["deleteToken"].as_str().unwrap().len() >= 16);
    assert!(created["expiresAt"].is_string());

    let (status, body) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["kind"], "text");
    assert_eq!(body["content"]["text"], "hello from the vault");
    assert_eq!(body["viewCount"], 1);
    assert_eq!(body["isProtected"], false);
    assert!(body.get("deleteToken").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn upload_rejects_bad_forms() {
    let t = build_app();
    let cases: Vec<Vec<Part<'_>>> = vec![
        vec![Part::Field("textContent", "no type")],
        vec![Part::Field("type", "text")],
        vec![Part::Field("type", "text"), Part::Field("textContent", "   ")],
        vec![Part::Field("type", "file")],
        vec![
            Part::Field("type", "text"),
            Part::Field("textContent", "x"),
            Part::Field("expiresInMinutes", "soon"),
        ],
        vec![
            Part::Field("type", "text"),
            Part::Field("textContent", "x"),
            Part::Field("maxDownloads", "0"),
        ],
    ];

    for parts in cases {
        let (status, body) = send(&t.app, upload_request(&parts)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(body["error"].is_string());
    }
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn retrieve_unknown_is_404() {
    let t = build_app();
    let (status, body) = send(&t.app, get_request("/api/doesnotx")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn expired_drop_is_403() {
    let t = build_app();
    let created = upload_text(&t.app, vec![Part::Field("expiresInMinutes", "10")]).await;
    let id = created["id"].as_str().unwrap();

    t.clock.advance(Duration::minutes(11));
    let (status, _) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn one_time_view_string_flag() {
    let t = build_app();
    let created = upload_text(&t.app, vec![Part::Field("oneTimeView", "true")]).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["oneTimeView"], true);

    let (status, _) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn one_time_view_false_string_is_not_one_time() {
    let t = build_app();
    let created = upload_text(&t.app, vec![Part::Field("oneTimeView", "false")]).await;
    let id = created["id"].as_str().unwrap();

    for _ in 0..2 {
        let (status, _) = send(&t.app, get_request(&format!("/api/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn max_downloads_exhausted_is_410() {
    let t = build_app();
    let created = upload_text(&t.app, vec![Part::Field("maxDownloads", "2")]).await;
    let id = created["id"].as_str().unwrap();

    for _ in 0..2 {
        let (status, _) = send(&t.app, get_request(&format!("/api/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::GONE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn huge_max_downloads_is_accepted() {
    let t = build_app();
    let created = upload_text(&t.app, vec![Part::Field("maxDownloads", "3000000000")]).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["maxDownloads"], 2_147_483_647);
}

#[tokio::test]
async fn password_errors_look_the_same() {
    let t = build_app();
    let created = upload_text(&t.app, vec![Part::Field("password", "s3cret")]).await;
    let id = created["id"].as_str().unwrap();

    let (missing_status, missing) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    let (wrong_status, wrong) =
        send(&t.app, get_request(&format!("/api/{id}?password=guess"))).await;

    assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing, wrong);
    assert_eq!(missing["protected"], true);

    let (status, body) = send(&t.app, get_request(&format!("/api/{id}?password=s3cret"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isProtected"], true);
    assert_eq!(body["viewCount"], 1);
}

// -- Files ----------------------------------------------------------------

#[tokio::test]
async fn upload_file_then_download() {
    let t = build_app();
    let parts = [
        Part::Field("type", "file"),
        Part::File {
            name: "notes v2.txt",
            content_type: "text/plain",
            data: b"file contents",
        },
    ];
    let (status, created) = send(&t.app, upload_request(&parts)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let id = created["id"].as_str().unwrap();
    assert_eq!(t.blobs.len(), 1);

    let response = t
        .app
        .clone()
        .oneshot(get_request(&format!("/api/{id}/download")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("filename=\"notes v2.txt\""));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"file contents");
}

#[tokio::test]
async fn file_metadata_is_retrievable() {
    let t = build_app();
    let parts = [
        Part::Field("type", "file"),
        Part::Field("maxDownloads", "1"),
        Part::File {
            name: "photo.png",
            content_type: "image/png",
            data: b"\x89PNG",
        },
    ];
    let (_, created) = send(&t.app, upload_request(&parts)).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "file");
    assert_eq!(body["content"]["originalName"], "photo.png");
    assert_eq!(body["content"]["mimeType"], "image/png");
    assert_eq!(body["viewCount"], 1);

    let (status, _) = send(&t.app, get_request(&format!("/api/{id}/download"))).await;
    assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn rejected_file_upload_releases_its_blob() {
    let t = build_app();
    let parts = [
        Part::Field("type", "file"),
        Part::Field("expiresInMinutes", "0"),
        Part::File {
            name: "a.bin",
            content_type: "application/octet-stream",
            data: b"\x00\x01",
        },
    ];
    let (status, _) = send(&t.app, upload_request(&parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(t.blobs.is_empty());
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn download_of_text_drop_is_400() {
    let t = build_app();
    let created = upload_text(&t.app, vec![]).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(&t.app, get_request(&format!("/api/{id}/download"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let t = build_app();
    let data = vec![b'x'; MAX_UPLOAD_BYTES + 1];
    let parts = [
        Part::Field("type", "file"),
        Part::File {
            name: "big.bin",
            content_type: "application/octet-stream",
            data: &data,
        },
    ];
    let response = t.app.clone().oneshot(upload_request(&parts)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(t.blobs.is_empty());
}

// -- Delete ---------------------------------------------------------------

#[tokio::test]
async fn delete_with_token() {
    let t = build_app();
    let created = upload_text(&t.app, vec![]).await;
    let id = created["id"].as_str().unwrap();
    let token = created["deleteToken"].as_str().unwrap();

    let (status, body) = send(&t.app, delete_request(id, "not-the-right-token")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid delete token");

    let (status, _) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::OK, "wrong token leaves the drop intact");

    let (status, body) = send(&t.app, delete_request(id, token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Drop deleted successfully");

    let (status, _) = send(&t.app, get_request(&format!("/api/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, delete_request(id, token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_file_drop_releases_blob() {
    let t = build_app();
    let parts = [
        Part::Field("type", "file"),
        Part::File {
            name: "a.txt",
            content_type: "text/plain",
            data: b"a",
        },
    ];
    let (_, created) = send(&t.app, upload_request(&parts)).await;
    let id = created["id"].as_str().unwrap();
    let token = created["deleteToken"].as_str().unwrap();

    let (status, _) = send(&t.app, delete_request(id, token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(t.blobs.is_empty());
}
