//! Request authentication.
//!
//! - [`auth`]: the [`auth::AdminUser`] extractor and the [`auth::require_admin`] layer
//!
//! # Authentication Flow
//!
//! 1. The access token is read from the `accessToken` cookie, falling back to
//!    `Authorization: Bearer <token>`
//! 2. Signature and expiry are checked
//! 3. The `sub` claim is resolved to a stored account
//! 4. The account must have the `admin` role
//! 5. The account is handed to the handler as [`auth::AdminUser`]
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AdminUser;
//!
//! async fn current_admin(admin: AdminUser) -> ApiResponse<AdminProfile> {
//!     ApiResponse::ok(admin.into_profile(), "Current Admin fetched successfully")
//! }
//! ```

pub mod auth;
