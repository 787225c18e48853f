use anyhow::anyhow;
use axum::extract::{Multipart, State, multipart::MultipartRejection};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::instrument;

use schoolhub_core::{ApiResponse, AppError, EmptyData, errors::ApiError};
use schoolhub_models::{
    AdminProfile, ChangeAdminPasswordDto, LoginAdminDto, LoginAdminResponse, RegisterAdminDto,
    UpdateAdminProfileDto,
};

use super::service::{AvatarUpload, UserService};
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, AdminUser, REFRESH_TOKEN_COOKIE};
use crate::state::AppState;
use crate::validator::ValidatedJson;

const AVATAR_FIELD: &str = "avatar";

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

/// Always emitted, whether or not the request carried the cookie.
fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

/// Register a new admin account
#[utoipa::path(
    post,
    path = "/api/v1/users/register-admin",
    request_body = RegisterAdminDto,
    responses(
        (status = 201, description = "Admin registered successfully", body = ApiResponse<AdminProfile>),
        (status = 400, description = "Missing or malformed fields", body = ApiError),
        (status = 409, description = "Username, email or phone already in use", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "Admin"
)]
#[instrument(skip(state, dto))]
pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterAdminDto>,
) -> Result<ApiResponse<AdminProfile>, AppError> {
    let profile = UserService::register_admin(&state.store, dto).await?;
    Ok(ApiResponse::created(profile, "Admin registered successfully"))
}

/// Log in with username or email and receive session tokens
///
/// Both tokens are also set as `httpOnly` cookies.
#[utoipa::path(
    post,
    path = "/api/v1/users/login-admin",
    request_body = LoginAdminDto,
    responses(
        (status = 200, description = "Admin logged in", body = ApiResponse<LoginAdminResponse>),
        (status = 400, description = "Username or email is required", body = ApiError),
        (status = 401, description = "Invalid user credentials", body = ApiError),
        (status = 404, description = "User does not exist", body = ApiError),
        (status = 500, description = "Token generation failed", body = ApiError)
    ),
    tag = "Admin"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginAdminDto>,
) -> Result<(CookieJar, ApiResponse<LoginAdminResponse>), AppError> {
    let response = UserService::login_admin(&state.store, &state.jwt_config, dto).await?;

    let jar = jar
        .add(session_cookie(ACCESS_TOKEN_COOKIE, response.access_token.clone()))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, response.refresh_token.clone()));

    Ok((jar, ApiResponse::ok(response, "Admin logged In Successfully")))
}

/// Get the authenticated admin
#[utoipa::path(
    get,
    path = "/api/v1/users/current-admin",
    responses(
        (status = 200, description = "Current admin", body = ApiResponse<AdminProfile>),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
        (status = 403, description = "Not an admin", body = ApiError)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(admin), fields(user_id = %admin.id()))]
pub async fn current_admin(admin: AdminUser) -> ApiResponse<AdminProfile> {
    ApiResponse::ok(admin.into_profile(), "Current Admin fetched successfully")
}

/// Replace name, username, email and phone
#[utoipa::path(
    patch,
    path = "/api/v1/users/update-admin-profile",
    request_body = UpdateAdminProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<AdminProfile>),
        (status = 400, description = "Missing or malformed fields", body = ApiError),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
        (status = 409, description = "Username, email or phone already in use", body = ApiError)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, admin, dto), fields(user_id = %admin.id()))]
pub async fn update_admin_profile(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<UpdateAdminProfileDto>,
) -> Result<ApiResponse<AdminProfile>, AppError> {
    let profile = UserService::update_profile(&state.store, admin.id(), dto).await?;
    Ok(ApiResponse::ok(profile, "Profile updated successfully"))
}

/// Upload a new avatar image (multipart field `avatar`)
#[utoipa::path(
    post,
    path = "/api/v1/users/upload-admin-avatar",
    request_body(content_type = "multipart/form-data", description = "Image file in the `avatar` field"),
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<AdminProfile>),
        (status = 400, description = "Avatar missing or upload failed", body = ApiError),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, admin, multipart), fields(user_id = %admin.id()))]
pub async fn upload_admin_avatar(
    State(state): State<AppState>,
    admin: AdminUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<AdminProfile>, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Avatar request is not multipart");
        AppError::bad_request(anyhow!("Avatar file is missing"))
    })?;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?;

        upload = Some(AvatarUpload { file_name, bytes });
        break;
    }

    let upload =
        upload.ok_or_else(|| AppError::bad_request(anyhow!("Avatar file is missing")))?;

    let profile = UserService::upload_avatar(
        &state.store,
        state.media.as_ref(),
        &state.media_config.temp_dir,
        admin.id(),
        upload,
    )
    .await?;

    Ok(ApiResponse::ok(profile, "Admin avatar updated successfully"))
}

/// Change the password after confirming the current one
#[utoipa::path(
    patch,
    path = "/api/v1/users/change-admin-password",
    request_body = ChangeAdminPasswordDto,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<EmptyData>),
        (status = 400, description = "Missing or short password", body = ApiError),
        (status = 401, description = "Invalid old password or token", body = ApiError)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, admin, dto), fields(user_id = %admin.id()))]
pub async fn change_admin_password(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<ChangeAdminPasswordDto>,
) -> Result<ApiResponse<EmptyData>, AppError> {
    UserService::change_password(&state.store, admin.id(), dto).await?;
    Ok(ApiResponse::ok(EmptyData {}, "Password changed successfully"))
}

/// Log out: clear the stored refresh token and both cookies
#[utoipa::path(
    post,
    path = "/api/v1/users/logout-admin",
    responses(
        (status = 200, description = "Admin logged out", body = ApiResponse<EmptyData>),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError)
    ),
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, admin, jar), fields(user_id = %admin.id()))]
pub async fn logout_admin(
    State(state): State<AppState>,
    admin: AdminUser,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<EmptyData>), AppError> {
    UserService::logout(&state.store, admin.id()).await?;

    let jar = jar
        .add(expired_cookie(ACCESS_TOKEN_COOKIE))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE));

    Ok((jar, ApiResponse::ok(EmptyData {}, "Admin logged Out")))
}
