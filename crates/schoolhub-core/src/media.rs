//! Media hosting abstraction.
//!
//! Uploaded files are first spooled to a local temp path; a [`MediaStore`]
//! takes that path and returns a public URL. Two backends exist:
//!
//! - [`LocalMediaStore`]: copies the file under a public directory served
//!   by the API itself.
//! - [`CloudinaryMediaStore`]: signed upload to Cloudinary's REST API.
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_core::media::{LocalMediaStore, MediaStore};
//! use std::path::{Path, PathBuf};
//!
//! let store = LocalMediaStore::new(
//!     PathBuf::from("./public"),
//!     "http://localhost:8000/public".to_string(),
//! );
//!
//! let media = store.upload(Path::new("./public/temp/abc.png"), "avatars").await?;
//! println!("{}", media.url);
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use uuid::Uuid;

/// Default maximum upload size (5MB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

pub type UploadFuture<'a> =
    Pin<Box<dyn Future<Output = Result<UploadedMedia, StorageError>> + Send + 'a>>;

/// A remote media host that accepts a local file and returns where it lives.
pub trait MediaStore: Send + Sync {
    /// Upload the file at `local_path` into `folder`.
    ///
    /// The caller owns `local_path` and is responsible for removing it.
    fn upload<'a>(&'a self, local_path: &'a Path, folder: &'a str) -> UploadFuture<'a>;
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    /// Public URL of the hosted file. May be empty if the host returned none.
    pub url: String,
    /// Backend-specific identifier (storage key or Cloudinary public id).
    pub key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File exceeds maximum size of {max_bytes} bytes")]
    InvalidFileSize { max_bytes: usize },

    #[error("File type '{received}' not allowed. Allowed types: {}", .allowed.join(", "))]
    InvalidFileType {
        received: String,
        allowed: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media host rejected upload: {0}")]
    Remote(String),
}

fn file_extension(path: &Path) -> Result<String, StorageError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StorageError::InvalidFileType {
            received: ext,
            allowed: ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(ext)
}

async fn check_size(path: &Path, max_bytes: usize) -> Result<(), StorageError> {
    let len = fs::metadata(path).await?.len();
    if len as usize > max_bytes {
        return Err(StorageError::InvalidFileSize { max_bytes });
    }
    Ok(())
}

/// Local filesystem-based media storage.
///
/// Files are stored under `base_dir` and addressed as `{base_url}/{key}`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalMediaStore {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    /// Rejects keys that could escape `base_dir`.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    pub fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

impl MediaStore for LocalMediaStore {
    fn upload<'a>(&'a self, local_path: &'a Path, folder: &'a str) -> UploadFuture<'a> {
        Box::pin(async move {
            check_size(local_path, self.max_file_size).await?;
            let ext = file_extension(local_path)?;

            let key = format!("{}/{}.{}", folder.trim_matches('/'), Uuid::new_v4(), ext);
            Self::validate_key(&key)?;

            let target = self.base_dir.join(&key);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::copy(local_path, &target).await?;

            let url = self.get_url(&key)?;
            tracing::debug!(key = %key, "Stored media locally");

            Ok(UploadedMedia { url, key })
        })
    }
}

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    public_id: Option<String>,
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorMessage,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

/// Signed uploads to Cloudinary (`resource_type = auto`).
#[derive(Clone)]
pub struct CloudinaryMediaStore {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    max_file_size: usize,
}

impl std::fmt::Debug for CloudinaryMediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryMediaStore")
            .field("api_base", &self.api_base)
            .field("cloud_name", &self.cloud_name)
            .field("max_file_size", &self.max_file_size)
            .finish_non_exhaustive()
    }
}

impl CloudinaryMediaStore {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: CLOUDINARY_API_BASE.to_string(),
            cloud_name,
            api_key,
            api_secret,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/auto/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }

    /// Hex SHA-256 of the sorted, `&`-joined params followed by the secret.
    fn sign(params_to_sign: &str, api_secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(params_to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl MediaStore for CloudinaryMediaStore {
    fn upload<'a>(&'a self, local_path: &'a Path, folder: &'a str) -> UploadFuture<'a> {
        Box::pin(async move {
            check_size(local_path, self.max_file_size).await?;
            let bytes = fs::read(local_path).await?;

            let file_name = local_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();

            let timestamp = chrono::Utc::now().timestamp().to_string();
            let signature = Self::sign(
                &format!("folder={}&timestamp={}", folder, timestamp),
                &self.api_secret,
            );

            let form = reqwest::multipart::Form::new()
                .part(
                    "file",
                    reqwest::multipart::Part::bytes(bytes).file_name(file_name),
                )
                .text("api_key", self.api_key.clone())
                .text("folder", folder.to_string())
                .text("timestamp", timestamp)
                .text("signature", signature)
                .text("signature_algorithm", "sha256");

            let response = self
                .client
                .post(self.upload_url())
                .multipart(form)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let message = response
                    .json::<CloudinaryErrorBody>()
                    .await
                    .map(|body| body.error.message)
                    .unwrap_or_else(|_| format!("status {}", status));
                return Err(StorageError::Remote(message));
            }

            let body: CloudinaryUploadResponse = response.json().await?;
            let url = body.secure_url.or(body.url).unwrap_or_default();

            Ok(UploadedMedia {
                url,
                key: body.public_id.unwrap_or_default(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("schoolhub-media-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_validate_key_accepts_valid_keys() {
        assert!(LocalMediaStore::validate_key("avatars/logo.png").is_ok());
        assert!(LocalMediaStore::validate_key("avatars/abc-123.jpg").is_ok());
        assert!(LocalMediaStore::validate_key("avatars/profile_pic.webp").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_traversal() {
        assert!(LocalMediaStore::validate_key("../../../etc/passwd").is_err());
        assert!(LocalMediaStore::validate_key("..\\windows\\system32").is_err());
    }

    #[test]
    fn test_validate_key_rejects_absolute_paths() {
        assert!(LocalMediaStore::validate_key("/etc/passwd").is_err());
        assert!(LocalMediaStore::validate_key("\\windows\\system32").is_err());
    }

    #[test]
    fn test_get_url_handles_trailing_slash() {
        let store = LocalMediaStore::new(
            PathBuf::from("./public"),
            "http://localhost:8000/public/".to_string(),
        );

        let url = store.get_url("avatars/a.png").unwrap();
        assert_eq!(url, "http://localhost:8000/public/avatars/a.png");
    }

    #[test]
    fn test_file_extension_is_checked() {
        assert_eq!(file_extension(Path::new("a/b/photo.PNG")).unwrap(), "png");
        assert!(matches!(
            file_extension(Path::new("script.sh")),
            Err(StorageError::InvalidFileType { .. })
        ));
        assert!(file_extension(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_cloudinary_signature() {
        let signature =
            CloudinaryMediaStore::sign("folder=avatars&timestamp=1700000000", "abcd");
        assert_eq!(
            signature,
            "3853f0ed59a5e7e68b562842ccef570b4695d89a0cf215a6717881b1e3e49428"
        );
    }

    #[test]
    fn test_cloudinary_upload_url() {
        let store = CloudinaryMediaStore::new(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
        )
        .with_api_base("http://localhost:9999/v1_1/");

        assert_eq!(store.upload_url(), "http://localhost:9999/v1_1/demo/auto/upload");
    }

    #[tokio::test]
    async fn test_local_upload_copies_file() {
        let root = scratch_dir();
        let source_dir = root.join("temp");
        fs::create_dir_all(&source_dir).await.unwrap();
        let source = source_dir.join("avatar.png");
        fs::write(&source, b"not really a png").await.unwrap();

        let store = LocalMediaStore::new(
            root.join("public"),
            "http://localhost:8000/public".to_string(),
        );
        let media = store.upload(&source, "avatars").await.unwrap();

        assert!(media.key.starts_with("avatars/"));
        assert!(media.key.ends_with(".png"));
        assert_eq!(media.url, format!("http://localhost:8000/public/{}", media.key));

        let stored = fs::read(root.join("public").join(&media.key)).await.unwrap();
        assert_eq!(stored, b"not really a png");
        // The source is left for the caller to clean up.
        assert!(fs::metadata(&source).await.is_ok());

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_upload_rejects_oversized_file() {
        let root = scratch_dir();
        fs::create_dir_all(&root).await.unwrap();
        let source = root.join("big.png");
        fs::write(&source, vec![0u8; 64]).await.unwrap();

        let store = LocalMediaStore::with_max_size(
            root.join("public"),
            "http://localhost:8000/public".to_string(),
            16,
        );
        let result = store.upload(&source, "avatars").await;

        assert!(matches!(
            result,
            Err(StorageError::InvalidFileSize { max_bytes: 16 })
        ));

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_upload_missing_file() {
        let store = LocalMediaStore::new(
            scratch_dir(),
            "http://localhost:8000/public".to_string(),
        );
        let result = store
            .upload(Path::new("/definitely/not/here.png"), "avatars")
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
