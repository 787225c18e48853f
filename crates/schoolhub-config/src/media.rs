//! Avatar storage settings.
//!
//! Uploads are spooled under `temp_dir` and then handed to the media host.
//! When all three `CLOUDINARY_*` variables are present the host is
//! Cloudinary; otherwise files land in `public_dir` and are served from
//! `base_url`.

use std::env;
use std::path::PathBuf;

use crate::env_or;

pub const DEFAULT_PUBLIC_DIR: &str = "./public";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/public";
pub const DEFAULT_TEMP_DIR: &str = "./public/temp";
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub public_dir: PathBuf,
    pub base_url: String,
    pub temp_dir: PathBuf,
    pub max_file_size: usize,
    pub cloudinary: Option<CloudinaryCredentials>,
}

impl MediaConfig {
    pub fn from_env() -> Self {
        let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());

        let cloudinary = match (
            non_empty_var("CLOUDINARY_CLOUD_NAME"),
            non_empty_var("CLOUDINARY_API_KEY"),
            non_empty_var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Self {
            public_dir: PathBuf::from(var("MEDIA_PUBLIC_DIR", DEFAULT_PUBLIC_DIR)),
            base_url: var("MEDIA_BASE_URL", DEFAULT_BASE_URL),
            temp_dir: PathBuf::from(var("UPLOAD_TEMP_DIR", DEFAULT_TEMP_DIR)),
            max_file_size: env_or("MEDIA_MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
            cloudinary,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            cloudinary: None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
