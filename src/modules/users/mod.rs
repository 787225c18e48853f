//! Admin accounts and sessions.
//!
//! - `repository`: persistence seam and its PostgreSQL implementation
//! - `store`: password hashing over the repository
//! - `service`: register, login, profile, avatar, password and logout flows
//! - `controller` / `router`: HTTP handlers under `/api/v1/users`

pub mod controller;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;
