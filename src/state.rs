use std::sync::Arc;

use schoolhub_config::{CorsConfig, JwtConfig, MediaConfig};
use schoolhub_core::MediaStore;
use schoolhub_core::media::{CloudinaryMediaStore, LocalMediaStore};
use schoolhub_db::PgPool;

use crate::modules::users::repository::{AccountRepository, PgAccountRepository};
use crate::modules::users::store::CredentialStore;

#[derive(Clone)]
pub struct AppState {
    pub store: CredentialStore,
    pub media: Arc<dyn MediaStore>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub media_config: MediaConfig,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        media: Arc<dyn MediaStore>,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        media_config: MediaConfig,
    ) -> Self {
        Self {
            store: CredentialStore::new(repo),
            media,
            jwt_config,
            cors_config,
            media_config,
        }
    }
}

/// Picks Cloudinary when credentials are configured, local disk otherwise.
pub fn build_media_store(config: &MediaConfig) -> Arc<dyn MediaStore> {
    match &config.cloudinary {
        Some(creds) => {
            tracing::info!(cloud_name = %creds.cloud_name, "Using Cloudinary media host");
            Arc::new(
                CloudinaryMediaStore::new(
                    creds.cloud_name.clone(),
                    creds.api_key.clone(),
                    creds.api_secret.clone(),
                )
                .with_max_size(config.max_file_size),
            )
        }
        None => {
            tracing::info!(dir = %config.public_dir.display(), "Using local media storage");
            Arc::new(LocalMediaStore::with_max_size(
                config.public_dir.clone(),
                config.base_url.clone(),
                config.max_file_size,
            ))
        }
    }
}

pub fn init_app_state(pool: PgPool) -> AppState {
    let media_config = MediaConfig::from_env();
    let media = build_media_store(&media_config);

    AppState::new(
        Arc::new(PgAccountRepository::new(pool)),
        media,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        media_config,
    )
}
