//! # SchoolHub Core
//!
//! Core types, errors, and utilities for the SchoolHub API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type rendered as the failure envelope
//! - [`response`]: The uniform success envelope
//! - [`password`]: bcrypt password hashing and verification
//! - [`media`]: Media hosting abstraction (local disk, Cloudinary)
//!
//! # Example
//!
//! ```ignore
//! use axum::http::StatusCode;
//! use schoolhub_core::{ApiResponse, AppError};
//! use schoolhub_core::password::{hash_password, verify_password};
//!
//! // Create an error
//! let error = AppError::not_found(anyhow::anyhow!("User does not exist"));
//!
//! // Hash a password
//! let hash = hash_password("secure_password")?;
//!
//! // Wrap a payload in the success envelope
//! let response = ApiResponse::new(StatusCode::OK, profile, "Current Admin fetched successfully");
//! ```

pub mod errors;
pub mod media;
pub mod password;
pub mod response;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use media::{MediaStore, StorageError, UploadedMedia};
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, EmptyData};
