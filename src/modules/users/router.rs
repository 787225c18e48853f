use axum::extract::DefaultBodyLimit;
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::middleware::auth::require_admin;
use crate::modules::users::controller::{
    change_admin_password, current_admin, login_admin, logout_admin, register_admin,
    update_admin_profile, upload_admin_avatar,
};
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn init_users_router(state: AppState) -> Router<AppState> {
    let avatar_limit = state.media_config.max_file_size + MULTIPART_OVERHEAD;

    let protected = Router::new()
        .route("/current-admin", get(current_admin))
        .route("/update-admin-profile", patch(update_admin_profile))
        .route(
            "/upload-admin-avatar",
            post(upload_admin_avatar).layer(DefaultBodyLimit::max(avatar_limit)),
        )
        .route("/change-admin-password", patch(change_admin_password))
        .route("/logout-admin", post(logout_admin))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/register-admin", post(register_admin))
        .route("/login-admin", post(login_admin))
        .merge(protected)
}
