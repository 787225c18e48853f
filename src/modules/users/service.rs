use std::path::{Path, PathBuf};

use anyhow::anyhow;
use axum::body::Bytes;
use tokio::fs;
use tracing::instrument;
use uuid::Uuid;

use schoolhub_auth::{TokenError, create_access_token, create_refresh_token};
use schoolhub_config::JwtConfig;
use schoolhub_core::{AppError, MediaStore};
use schoolhub_models::{
    Account, AdminProfile, ChangeAdminPasswordDto, LoginAdminDto, LoginAdminResponse,
    RegisterAdminDto, Role, UpdateAdminProfileDto, UserId,
};

use super::store::{ADMIN_NOT_FOUND, CredentialStore};

pub const AVATAR_FOLDER: &str = "avatars";

const TOKEN_FAILURE: &str = "Something went wrong while generating refresh and access token";

/// A file received in the `avatar` multipart field.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Access and refresh token issued for one login.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct UserService;

impl UserService {
    #[instrument(skip(store, dto), fields(username = %dto.username))]
    pub async fn register_admin(
        store: &CredentialStore,
        dto: RegisterAdminDto,
    ) -> Result<AdminProfile, AppError> {
        let admin = dto.into_new_admin().map_err(AppError::bad_request)?;
        let account = store.create(admin, Role::Admin).await?;

        tracing::info!(user_id = %account.id, "Admin registered");
        Ok(account.into())
    }

    #[instrument(skip(store, jwt_config, dto))]
    pub async fn login_admin(
        store: &CredentialStore,
        jwt_config: &JwtConfig,
        dto: LoginAdminDto,
    ) -> Result<LoginAdminResponse, AppError> {
        let identities = dto.identities();
        if identities.is_empty() {
            return Err(AppError::bad_request(anyhow!("Username or email is required")));
        }

        let mut found = None;
        for identity in identities {
            if let Some(account) = store.find_by_identity(identity).await? {
                found = Some(account);
                break;
            }
        }
        let account =
            found.ok_or_else(|| AppError::not_found(anyhow!("User does not exist")))?;

        if !store.verify_secret(&account, &dto.password)? {
            tracing::warn!(user_id = %account.id, "Login rejected: wrong password");
            return Err(AppError::unauthorized("Invalid user credentials"));
        }

        let tokens = Self::issue_session(store, jwt_config, &account).await?;

        Ok(LoginAdminResponse {
            user: account.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Issues both tokens and stores the refresh token, replacing any previous one.
    pub async fn issue_session(
        store: &CredentialStore,
        jwt_config: &JwtConfig,
        account: &Account,
    ) -> Result<SessionTokens, AppError> {
        let user_id = account.id.into_inner();

        let access_token = create_access_token(user_id, account.role.as_str(), jwt_config)
            .map_err(token_failure)?;
        let refresh_token = create_refresh_token(user_id, jwt_config).map_err(token_failure)?;

        store
            .set_refresh_credential(account.id, Some(&refresh_token))
            .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    #[instrument(skip(store, dto))]
    pub async fn update_profile(
        store: &CredentialStore,
        admin_id: UserId,
        dto: UpdateAdminProfileDto,
    ) -> Result<AdminProfile, AppError> {
        let update = dto.into_profile_update().map_err(AppError::bad_request)?;
        let account = store.update_profile(admin_id, update).await?;
        Ok(account.into())
    }

    /// Spools the upload to `temp_dir`, hands it to the media host and stores
    /// the resulting URL. The spooled file is removed whatever the outcome.
    #[instrument(skip(store, media, upload), fields(size = upload.bytes.len()))]
    pub async fn upload_avatar(
        store: &CredentialStore,
        media: &dyn MediaStore,
        temp_dir: &Path,
        admin_id: UserId,
        upload: AvatarUpload,
    ) -> Result<AdminProfile, AppError> {
        if upload.bytes.is_empty() {
            return Err(AppError::bad_request(anyhow!("Avatar file is missing")));
        }

        let temp_path = spool_path(temp_dir, upload.file_name.as_deref());
        fs::create_dir_all(temp_dir).await?;
        fs::write(&temp_path, &upload.bytes).await?;

        let uploaded = media.upload(&temp_path, AVATAR_FOLDER).await;

        if let Err(e) = fs::remove_file(&temp_path).await {
            tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove spooled upload");
        }

        let url = match uploaded {
            Ok(hosted) if !hosted.url.is_empty() => hosted.url,
            Ok(_) => {
                tracing::warn!("Media host returned no URL");
                return Err(AppError::bad_request(anyhow!("Error while uploading avatar")));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Avatar upload failed");
                return Err(AppError::bad_request(anyhow!("Error while uploading avatar")));
            }
        };

        let account = store.set_avatar(admin_id, &url).await?;
        Ok(account.into())
    }

    #[instrument(skip(store, dto))]
    pub async fn change_password(
        store: &CredentialStore,
        admin_id: UserId,
        dto: ChangeAdminPasswordDto,
    ) -> Result<(), AppError> {
        let account = store
            .find_by_id(admin_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!(ADMIN_NOT_FOUND)))?;

        if !store.verify_secret(&account, &dto.old_password)? {
            return Err(AppError::unauthorized("Invalid old password"));
        }

        store.change_secret(admin_id, &dto.new_password).await
    }

    #[instrument(skip(store))]
    pub async fn logout(store: &CredentialStore, admin_id: UserId) -> Result<(), AppError> {
        store.set_refresh_credential(admin_id, None).await
    }
}

fn token_failure(err: TokenError) -> AppError {
    tracing::error!(error = %err, "Token generation failed");
    AppError::internal_error(TOKEN_FAILURE)
}

/// `{temp_dir}/{uuid}.{ext}`, keeping the client's extension so the media
/// host can check the file type.
fn spool_path(temp_dir: &Path, file_name: Option<&str>) -> PathBuf {
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    temp_dir.join(format!("{}{}", Uuid::new_v4(), ext))
}
