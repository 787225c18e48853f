#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use schoolhub::modules::users::memory::InMemoryAccountRepository;
use schoolhub::router::init_router;
use schoolhub::state::AppState;
use schoolhub_config::{CorsConfig, JwtConfig, MediaConfig};
use schoolhub_core::media::UploadFuture;
use schoolhub_core::{MediaStore, StorageError, UploadedMedia, hash_password};
use schoolhub_models::{Account, Email, PhoneNumber, Role, UserId};

pub const PASSWORD: &str = "secret123";
pub const MEDIA_BASE_URL: &str = "https://media.test";

/// Records every upload and answers with a URL under [`MEDIA_BASE_URL`].
#[derive(Default)]
pub struct RecordingMediaStore {
    pub uploads: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MediaStore for RecordingMediaStore {
    fn upload<'a>(&'a self, local_path: &'a Path, folder: &'a str) -> UploadFuture<'a> {
        Box::pin(async move {
            if self.fail {
                return Err(StorageError::Remote("media host unavailable".to_string()));
            }

            let file_name = local_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            self.uploads
                .lock()
                .unwrap()
                .push((folder.to_string(), file_name.clone()));

            Ok(UploadedMedia {
                url: format!("{MEDIA_BASE_URL}/{folder}/{file_name}"),
                key: format!("{folder}/{file_name}"),
            })
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryAccountRepository>,
    pub media: Arc<RecordingMediaStore>,
    pub jwt_config: JwtConfig,
    pub temp_dir: PathBuf,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        access_token_secret: "integration-access-secret".to_string(),
        refresh_token_secret: "integration-refresh-secret".to_string(),
        access_token_expiry: 86400,
        refresh_token_expiry: 604800,
    }
}

pub fn setup_test_app() -> TestApp {
    setup_with_media(RecordingMediaStore::default())
}

pub fn setup_with_media(media: RecordingMediaStore) -> TestApp {
    let repo = Arc::new(InMemoryAccountRepository::new());
    let media = Arc::new(media);
    let scratch = std::env::temp_dir().join(format!("schoolhub-it-{}", Uuid::new_v4()));

    let media_config = MediaConfig {
        public_dir: scratch.join("public"),
        base_url: MEDIA_BASE_URL.to_string(),
        temp_dir: scratch.join("temp"),
        max_file_size: 1024 * 1024,
        cloudinary: None,
    };

    let state = AppState::new(
        repo.clone(),
        media.clone(),
        jwt_config(),
        CorsConfig::default(),
        media_config,
    );

    TestApp {
        router: init_router(state),
        repo,
        media,
        jwt_config: jwt_config(),
        temp_dir: scratch.join("temp"),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` pairs from every `Set-Cookie` header.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .collect()
    }

    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.set_cookies().iter().find_map(|c| {
            c.split(';')
                .next()
                .and_then(|pair| pair.strip_prefix(&format!("{name}=")))
                .map(str::to_string)
        })
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, suffix: &str, phone: &str) -> TestResponse {
        self.send(json_request(
            "POST",
            "/api/v1/users/register-admin",
            registration(suffix, phone),
            None,
        ))
        .await
    }

    /// Registers and logs in, returning the access token.
    pub async fn admin_token(&self, suffix: &str, phone: &str) -> String {
        let registered = self.register(suffix, phone).await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let login = self
            .send(json_request(
                "POST",
                "/api/v1/users/login-admin",
                json!({ "username": suffix, "password": PASSWORD }),
                None,
            ))
            .await;
        assert_eq!(login.status, StatusCode::OK);

        login.body["data"]["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Stores an account with the given role directly in the repository.
    pub async fn seed_account(&self, username: &str, phone: &str, role: Role) -> Account {
        let now = Utc::now();
        let account = Account {
            id: UserId::new(),
            name: "Seeded User".to_string(),
            username: username.to_string(),
            phone: PhoneNumber::new(phone).unwrap(),
            email: Email::new(format!("{username}@school.org")).unwrap(),
            password_hash: hash_password(PASSWORD).unwrap(),
            role,
            avatar: String::new(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        self.repo.seed(account.clone()).await;
        account
    }
}

pub fn registration(suffix: &str, phone: &str) -> Value {
    json!({
        "name": format!("Admin {suffix}"),
        "username": suffix,
        "phone": phone,
        "email": format!("{suffix}@school.org"),
        "password": PASSWORD,
    })
}

pub fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn cookie_request(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub const BOUNDARY: &str = "schoolhub-test-boundary";

/// A `multipart/form-data` body with a single file part.
pub fn multipart_request(
    uri: &str,
    token: &str,
    field: &str,
    file_name: &str,
    contents: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
