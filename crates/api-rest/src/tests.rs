//! Router-level tests driving the full app with `oneshot`.

use crate::{router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use carepoint_core::validation::validate_signup;
use carepoint_core::{CoreConfig, EmailAddress, NewUser, ShardableUuid};
use carepoint_files::{FilesError, MediaStore, MediaUpload, StoredMedia};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "carepoint-test-boundary";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

#[derive(Default)]
struct RecordingStore {
    uploads: Mutex<Vec<MediaUpload>>,
    destroyed: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStore for RecordingStore {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, FilesError> {
        let stored = StoredMedia {
            public_id: format!("{}/{}", upload.folder, upload.public_id),
            secure_url: format!("https://media.test/{}/{}", upload.folder, upload.public_id),
        };
        self.uploads.lock().unwrap().push(upload);
        Ok(stored)
    }

    async fn destroy(&self, public_id: &str) -> Result<(), FilesError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

struct TestApp {
    _data: TempDir,
    audio: TempDir,
    store: Arc<RecordingStore>,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let data = TempDir::new().unwrap();
        let audio = TempDir::new().unwrap();
        let store = Arc::new(RecordingStore::default());
        let cfg = Arc::new(CoreConfig::new(data.path()).unwrap());
        let state = AppState::new(cfg, store.clone(), "gemini-folder", audio.path());
        Self {
            _data: data,
            audio,
            store,
            state,
        }
    }

    fn router(&self) -> Router {
        router(self.state.clone())
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self.router().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body.to_vec())
    }

    async fn send_json(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(req).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// Creates a user directly through the core service and logs in over HTTP.
    async fn login_as(&self, name: &str, email: &str) -> (String, String) {
        let user = self
            .state
            .auth
            .register(NewUser {
                input: validate_signup(name, email, "correcthorse").unwrap(),
                profile_image: None,
            })
            .unwrap();

        let (status, headers, _) = self
            .send(json_request(
                Method::POST,
                "/auth/login",
                None,
                json!({"email": email, "password": "correcthorse"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        (user.id.to_string(), cookie_from(&headers))
    }

    fn uploads(&self) -> usize {
        self.store.uploads.lock().unwrap().len()
    }

    /// Lets spawned deletion tasks run, then returns what was destroyed.
    async fn destroyed(&self) -> Vec<String> {
        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
        self.store.destroyed.lock().unwrap().clone()
    }
}

fn cookie_from(headers: &HeaderMap) -> String {
    let set = headers
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    set.split(';').next().unwrap().to_string()
}

fn request(method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(c) => builder.header(COOKIE, c),
        None => builder,
    }
}

fn empty_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(method, uri, cookie).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    request(method, uri, cookie)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

struct FilePart<'a> {
    field: &'a str,
    filename: &'a str,
    content_type: &'a str,
    bytes: &'a [u8],
}

fn multipart_request(
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.filename, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    request(method, uri, cookie)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn full_details() -> Value {
    json!({
        "age": 34,
        "gender": "female",
        "country": "Kenya",
        "allergies": ["penicillin"],
        "bloodGroup": "AB-",
        "terminalIlless": false,
        "acuteIllness": "flu",
        "currentMedications": "ibuprofen",
        "previousSurgery": "appendectomy"
    })
}

#[tokio::test]
async fn health_reports_alive() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(empty_request(Method::GET, "/health", None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "message": "Carepoint REST API is alive"}));
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = TestApp::new();
    let id = ShardableUuid::new().to_string();

    for req in [
        empty_request(Method::GET, &format!("/users/{id}/profile"), None),
        empty_request(Method::DELETE, &format!("/users/{id}/delete-account"), None),
        json_request(
            Method::POST,
            &format!("/users/{id}/create-record"),
            Some("sid=forged"),
            json!({}),
        ),
        empty_request(Method::POST, "/auth/logout", None),
    ] {
        let (status, body) = app.send_json(req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Unauthorized"}));
    }
}

#[tokio::test]
async fn malformed_ids_are_rejected_before_lookup() {
    let app = TestApp::new();
    let (_, cookie) = app.login_as("Ada", "ada@example.com").await;
    let bad = "550E8400-E29B-41D4-A716-446655440000";

    let (status, body) = app
        .send_json(empty_request(
            Method::GET,
            &format!("/users/{bad}/profile"),
            Some(&cookie),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid user ID"}));

    let (status, body) = app
        .send_json(empty_request(
            Method::DELETE,
            "/users/not-an-id/delete-account",
            Some(&cookie),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid user ID"}));

    let (status, body) = app
        .send_json(json_request(
            Method::PUT,
            "/records/xyz/update-record",
            Some(&cookie),
            full_details(),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid record ID"}));

    let (status, _) = app
        .send_json(multipart_request(
            Method::PUT,
            "/users/short/update-profile",
            Some(&cookie),
            &[("fullname", "Ada"), ("email", "ada@example.com")],
            Some(FilePart {
                field: "profileImage",
                filename: "face.jpg",
                content_type: "image/jpeg",
                bytes: JPEG_MAGIC,
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.uploads(), 0);
}

#[tokio::test]
async fn profile_of_unknown_user_is_a_400() {
    let app = TestApp::new();
    let (_, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(empty_request(
            Method::GET,
            &format!("/users/{}/profile", ShardableUuid::new()),
            Some(&cookie),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"message": "An error occured while fetching user details"})
    );
}

#[tokio::test]
async fn profile_hides_credentials() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(empty_request(
            Method::GET,
            &format!("/users/{id}/profile"),
            Some(&cookie),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("profileImageId").is_none());
}

#[tokio::test]
async fn update_profile_with_jpeg_replaces_image() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;
    let uri = format!("/users/{id}/update-profile");
    let jpeg = |name: &'static str| FilePart {
        field: "profileImage",
        filename: name,
        content_type: "image/jpeg",
        bytes: JPEG_MAGIC,
    };

    let (status, first) = app
        .send_json(multipart_request(
            Method::PUT,
            &uri,
            Some(&cookie),
            &[("fullname", "Ada King"), ("email", "ada@example.com")],
            Some(jpeg("one.jpg")),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["fullname"], "Ada King");
    let first_image = first["profileImage"].as_str().unwrap().to_string();
    assert!(first_image.starts_with("https://media.test/gemini-folder/"));
    assert!(first_image.ends_with("-one.jpg"));

    let (status, second) = app
        .send_json(multipart_request(
            Method::PUT,
            &uri,
            Some(&cookie),
            &[("fullname", "Ada King"), ("email", "ada@example.com")],
            Some(jpeg("two.jpg")),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second["profileImage"], json!(first_image));

    assert_eq!(app.uploads(), 2);
    let destroyed = app.destroyed().await;
    assert_eq!(destroyed.len(), 1);
    assert!(destroyed[0].ends_with("-one.jpg"));
}

#[tokio::test]
async fn update_profile_with_text_file_keeps_image() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(multipart_request(
            Method::PUT,
            &format!("/users/{id}/update-profile"),
            Some(&cookie),
            &[("fullname", "Ada"), ("email", "ada@example.com")],
            Some(FilePart {
                field: "profileImage",
                filename: "notes.txt",
                content_type: "text/plain",
                bytes: b"not an image",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profileImage"], Value::Null);
    assert_eq!(app.uploads(), 0);
}

#[tokio::test]
async fn oversize_image_is_a_plain_413() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;
    let mut big = JPEG_MAGIC.to_vec();
    big.resize(5 * 1024 * 1024 + 1, 0);

    let (status, _, body) = app
        .send(multipart_request(
            Method::PUT,
            &format!("/users/{id}/update-profile"),
            Some(&cookie),
            &[("fullname", "Ada"), ("email", "ada@example.com")],
            Some(FilePart {
                field: "profileImage",
                filename: "huge.jpg",
                content_type: "image/jpeg",
                bytes: &big,
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, b"File too large");
    assert_eq!(app.uploads(), 0);
}

#[tokio::test]
async fn update_profile_validation_lists_field_errors() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(multipart_request(
            Method::PUT,
            &format!("/users/{id}/update-profile"),
            Some(&cookie),
            &[("fullname", "  "), ("email", "nope")],
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["fullname", "email"]);
}

#[tokio::test]
async fn update_profile_of_unknown_user_discards_new_image() {
    let app = TestApp::new();
    let (_, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(multipart_request(
            Method::PUT,
            &format!("/users/{}/update-profile", ShardableUuid::new()),
            Some(&cookie),
            &[("fullname", "Ghost"), ("email", "ghost@example.com")],
            Some(FilePart {
                field: "profileImage",
                filename: "ghost.png",
                content_type: "image/png",
                bytes: b"\x89PNG\r\n\x1a\n",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"message": "An error occured while creating new user"})
    );
    assert_eq!(app.destroyed().await.len(), 1);
}

#[tokio::test]
async fn deleting_unknown_account_still_confirms() {
    let app = TestApp::new();
    let (_, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(empty_request(
            Method::DELETE,
            &format!("/users/{}/delete-account", ShardableUuid::new()),
            Some(&cookie),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "User successfully deleted"}));
}

#[tokio::test]
async fn deleting_own_account_ends_the_session() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, _) = app
        .send_json(empty_request(
            Method::DELETE,
            &format!("/users/{id}/delete-account"),
            Some(&cookie),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send_json(empty_request(
            Method::GET,
            &format!("/users/{id}/profile"),
            Some(&cookie),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_record_reflects_all_nine_fields() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    // The path id is not consulted; the record belongs to the session user.
    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            &format!("/users/{}/create-record", ShardableUuid::new()),
            Some(&cookie),
            full_details(),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Your medical records have been successfully saved. You can change this informtion anytime in the settings page"
    );

    let (status, records) = app
        .send_json(empty_request(
            Method::GET,
            &format!("/users/{id}/records"),
            Some(&cookie),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    let details = &records[0]["details"];
    assert_eq!(records[0]["user"], json!(id));
    assert_eq!(details["age"], json!(34));
    assert_eq!(details["gender"], "female");
    assert_eq!(details["country"], "Kenya");
    assert_eq!(details["allergies"], json!(["penicillin"]));
    assert_eq!(details["bloodGroup"], "AB-");
    assert_eq!(details["terminalIllness"], json!(false));
    assert_eq!(details["acuteIllness"], "flu");
    assert_eq!(details["currentMedications"], "ibuprofen");
    assert_eq!(details["previousSurgery"], "appendectomy");
}

#[tokio::test]
async fn update_record_answers_200_even_when_missing() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;
    let record = app
        .state
        .users
        .create_record(&ShardableUuid::parse(&id).unwrap(), Default::default())
        .unwrap();

    for record_id in [record.id.to_string(), ShardableUuid::new().to_string()] {
        let (status, body) = app
            .send_json(json_request(
                Method::PUT,
                &format!("/records/{record_id}/update-record"),
                Some(&cookie),
                json!({"age": 35}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Your medical records have been updated!"}));
    }

    let updated = app.state.users.get_record(&record.id).unwrap().unwrap();
    assert_eq!(updated.details.age, Some(json!(35)));
}

#[tokio::test]
async fn sequential_symptom_uploads_keep_the_last_recording() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;
    let uri = format!("/users/{id}/upload-symptoms");

    for (name, bytes) in [("a.mp3", &b"first take"[..]), ("b.mp3", &b"second"[..])] {
        let (status, body) = app
            .send_json(multipart_request(
                Method::POST,
                &uri,
                Some(&cookie),
                &[],
                Some(FilePart {
                    field: "audio",
                    filename: name,
                    content_type: "audio/mpeg",
                    bytes,
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["path"].as_str().unwrap().ends_with("symptoms"));
    }

    let stored = std::fs::read(app.audio.path().join("symptoms")).unwrap();
    assert_eq!(stored, b"second");
    assert_eq!(app.uploads(), 0);
}

#[tokio::test]
async fn symptom_upload_of_an_image_is_dropped() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(multipart_request(
            Method::POST,
            &format!("/users/{id}/upload-symptoms"),
            Some(&cookie),
            &[],
            Some(FilePart {
                field: "audio",
                filename: "face.jpg",
                content_type: "image/jpeg",
                bytes: JPEG_MAGIC,
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], Value::Null);
    assert!(!app.audio.path().join("symptoms").exists());
}

#[tokio::test]
async fn register_login_logout() {
    let app = TestApp::new();
    let signup = |email: &'static str| {
        multipart_request(
            Method::POST,
            "/auth/register",
            None,
            &[
                ("fullname", "Ada Lovelace"),
                ("email", email),
                ("password", "correcthorse"),
            ],
            Some(FilePart {
                field: "profileImage",
                filename: "me.png",
                content_type: "image/png",
                bytes: b"\x89PNG\r\n\x1a\n",
            }),
        )
    };

    let (status, user) = app.send_json(signup("ada@example.com")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(user["profileImage"]
        .as_str()
        .unwrap()
        .ends_with("-me.png"));

    let (status, body) = app.send_json(signup("ADA@example.com")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email address is already registered");
    assert_eq!(app.destroyed().await.len(), 1);

    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "ada@example.com", "password": "wronghorse"}),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, headers, _) = app
        .send(json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "ada@example.com", "password": "correcthorse"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie_from(&headers);
    assert!(cookie.starts_with("sid="));

    let (status, headers, _) = app
        .send(empty_request(Method::POST, "/auth/logout", Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cookie_from(&headers), "sid=");

    let (status, _) = app
        .send_json(empty_request(Method::POST, "/auth/logout", Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validation_failure_lists_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .send_json(multipart_request(
            Method::POST,
            "/auth/register",
            None,
            &[("fullname", "Ada"), ("email", "ada@example.com"), ("password", "short")],
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "password");
}

#[tokio::test]
async fn password_reset_flow() {
    let app = TestApp::new();
    app.login_as("Ada", "ada@example.com").await;

    let (status, _) = app
        .send_json(json_request(
            Method::POST,
            "/auth/reset",
            None,
            json!({"email": "nobody@example.com"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = app
        .state
        .auth
        .request_reset(&EmailAddress::parse("ada@example.com").unwrap())
        .unwrap()
        .unwrap();

    let (status, _) = app
        .send_json(json_request(
            Method::POST,
            "/auth/confirm-reset",
            None,
            json!({"email": "ada@example.com", "token": "000000x"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/auth/confirm-reset",
            None,
            json!({"email": "ada@example.com", "token": token}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token verified");

    let change = json!({
        "email": "ada@example.com",
        "token": token,
        "password": "batterystaple",
        "confirmPassword": "batterystaple"
    });
    let (status, _) = app
        .send_json(json_request(
            Method::POST,
            "/auth/change-password",
            None,
            change.clone(),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send_json(json_request(Method::POST, "/auth/change-password", None, change))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send_json(json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"email": "ada@example.com", "password": "batterystaple"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(empty_request(Method::GET, "/api-docs/openapi.json", None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/users/{userId}/update-profile").is_some());
    assert!(body["paths"].get("/auth/register").is_some());
}

#[tokio::test]
async fn create_record_without_json_content_type_stores_empty_details() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(empty_request(
            Method::POST,
            &format!("/users/{id}/create-record"),
            Some(&cookie),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Your medical records have been successfully saved"));

    let records = app
        .state
        .users
        .list_records(&ShardableUuid::parse(&id).unwrap());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].details, api_shared::MedicalDetails::default());
}

#[tokio::test]
async fn malformed_record_json_uses_the_message_envelope() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, headers, body) = app
        .send(
            request(
                Method::POST,
                &format!("/users/{id}/create-record"),
                Some(&cookie),
            )
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        headers.get(CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn update_record_without_body_still_answers_200() {
    let app = TestApp::new();
    let (_, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(empty_request(
            Method::PUT,
            &format!("/records/{}/update-record", ShardableUuid::new()),
            Some(&cookie),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Your medical records have been updated!"}));
}

#[tokio::test]
async fn update_profile_accepts_a_json_body() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(json_request(
            Method::PUT,
            &format!("/users/{id}/update-profile"),
            Some(&cookie),
            json!({"fullname": "Ada King", "email": "ada.king@example.com"}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fullname"], "Ada King");
    assert_eq!(body["email"], "ada.king@example.com");
    assert_eq!(app.uploads(), 0);
}

#[tokio::test]
async fn update_profile_accepts_an_urlencoded_body() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(
            request(
                Method::PUT,
                &format!("/users/{id}/update-profile"),
                Some(&cookie),
            )
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("fullname=Ada+King&email=ada%40example.com"))
            .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fullname"], "Ada King");
}

#[tokio::test]
async fn update_profile_json_body_still_validates() {
    let app = TestApp::new();
    let (id, cookie) = app.login_as("Ada", "ada@example.com").await;

    let (status, body) = app
        .send_json(json_request(
            Method::PUT,
            &format!("/users/{id}/update-profile"),
            Some(&cookie),
            json!({"fullname": "Ada"}),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["message"], "Email is required");
}

#[tokio::test]
async fn reset_token_stops_working_after_repeated_wrong_guesses() {
    let app = TestApp::new();
    app.login_as("Ada", "ada@example.com").await;
    let token = app
        .state
        .auth
        .request_reset(&EmailAddress::parse("ada@example.com").unwrap())
        .unwrap()
        .unwrap();
    let wrong = if token == "000000" { "000001" } else { "000000" };

    for _ in 0..5 {
        let (status, _) = app
            .send_json(json_request(
                Method::POST,
                "/auth/confirm-reset",
                None,
                json!({"email": "ada@example.com", "token": wrong}),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/auth/confirm-reset",
            None,
            json!({"email": "ada@example.com", "token": token}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");
}
