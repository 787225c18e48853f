use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use schoolhub_core::{EmptyData, errors::ApiError};
use schoolhub_models::{
    AdminProfile, ChangeAdminPasswordDto, LoginAdminDto, LoginAdminResponse, RegisterAdminDto,
    Role, UpdateAdminProfileDto,
};

use crate::middleware::auth::ACCESS_TOKEN_COOKIE;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::register_admin,
        crate::modules::users::controller::login_admin,
        crate::modules::users::controller::current_admin,
        crate::modules::users::controller::update_admin_profile,
        crate::modules::users::controller::upload_admin_avatar,
        crate::modules::users::controller::change_admin_password,
        crate::modules::users::controller::logout_admin,
    ),
    components(
        schemas(
            AdminProfile,
            Role,
            RegisterAdminDto,
            LoginAdminDto,
            LoginAdminResponse,
            UpdateAdminProfileDto,
            ChangeAdminPasswordDto,
            EmptyData,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Admin registration, session and profile endpoints")
    ),
    info(
        title = "SchoolHub API",
        version = "0.1.0",
        description = "School management backend: admin accounts with cookie or bearer JWT sessions.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_TOKEN_COOKIE))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_admin_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/users/register-admin",
            "/api/v1/users/login-admin",
            "/api/v1/users/current-admin",
            "/api/v1/users/update-admin-profile",
            "/api/v1/users/upload-admin-avatar",
            "/api/v1/users/change-admin-password",
            "/api/v1/users/logout-admin",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_security_schemes_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.security_schemes.contains_key("cookie_auth"));
    }
}
