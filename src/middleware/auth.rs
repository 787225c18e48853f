use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use schoolhub_auth::{TokenError, verify_access_token};
use schoolhub_core::AppError;
use schoolhub_models::{Account, AdminProfile, UserId};

use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// The authenticated admin account.
///
/// Inserted into request extensions by [`require_admin`]; when the layer is
/// absent the extractor runs the same checks itself.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Account);

impl AdminUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }

    pub fn into_profile(self) -> AdminProfile {
        self.0.into()
    }
}

/// Cookie first, then `Authorization: Bearer`.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Resolves the request's access token to an admin account.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Account, AppError> {
    let token = extract_access_token(headers)
        .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;

    let claims = verify_access_token(&token, &state.jwt_config).map_err(|e| match e {
        TokenError::Expired => AppError::unauthorized("Access token expired"),
        _ => AppError::unauthorized("Invalid access token"),
    })?;

    let user_id: UserId = claims
        .sub
        .parse()
        .map_err(|_| AppError::unauthorized("Invalid access token"))?;

    let account = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid Access Token"))?;

    if !account.is_admin() {
        tracing::warn!(user_id = %account.id, role = %account.role, "Non-admin rejected");
        return Err(AppError::forbidden("Access denied: Admins only"));
    }

    Ok(account)
}

/// Route layer admitting only authenticated admins.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let account = authenticate(req.headers(), &state).await?;
    req.extensions_mut().insert(AdminUser(account));
    Ok(next.run(req).await)
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<AdminUser>() {
            return Ok(admin.clone());
        }

        authenticate(&parts.headers, state).await.map(AdminUser)
    }
}
