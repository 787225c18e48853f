//! # SchoolHub Models
//!
//! Domain models and DTOs for the SchoolHub API.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed UUID identifiers
//! - [`value_types`]: validated primitives (`Email`, `PhoneNumber`)
//! - [`users`]: the account entity, its public view and the admin DTOs
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_models::users::{Account, AdminProfile, Role};
//!
//! let profile = AdminProfile::from(account);
//! assert_eq!(profile.role, Role::Admin);
//! ```

pub mod ids;
pub mod users;
pub mod value_types;

// Re-export commonly used types at crate root for convenience
pub use ids::UserId;
pub use users::{
    Account, AdminProfile, ChangeAdminPasswordDto, LoginAdminDto, LoginAdminResponse, NewAdmin,
    ProfileUpdate, RegisterAdminDto, Role, UpdateAdminProfileDto,
};
pub use value_types::{Email, PhoneNumber, ValueTypeError};
