//! Account entity, its public view and the admin session DTOs.
//!
//! [`Account`] is the stored record and carries the password hash and the
//! current refresh token. It is never serialized; responses use
//! [`AdminProfile`], which has no secret fields.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::UserId;
use crate::value_types::{Email, PhoneNumber, ValueTypeError};

pub const MIN_PASSWORD_LENGTH: usize = 6;
/// bcrypt ignores input past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    #[default]
    Admin,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            "parent" => Ok(Role::Parent),
            other => Err(ValueTypeError::InvalidRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ValueTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A stored account row (`users` table).
#[derive(Clone, FromRow)]
pub struct Account {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub phone: PhoneNumber,
    pub email: Email,
    /// bcrypt hash, never the plaintext
    #[sqlx(rename = "password")]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub avatar: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Public view of an account, returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: UserId,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada")]
    pub username: String,
    pub phone: PhoneNumber,
    pub email: Email,
    pub role: Role,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AdminProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            username: account.username,
            phone: account.phone,
            email: account.email,
            role: account.role,
            avatar: account.avatar,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Validated input for creating an account. `password` is still plaintext.
#[derive(Clone)]
pub struct NewAdmin {
    pub name: String,
    pub username: String,
    pub phone: PhoneNumber,
    pub email: Email,
    pub password: String,
}

/// Validated replacement of the editable identity fields.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub username: String,
    pub email: Email,
    pub phone: PhoneNumber,
}

// ============================================================================
// Request DTOs
// ============================================================================
//
// Fields default to empty so that a missing field is reported by the
// validator alongside blank ones, instead of as a JSON rejection.

fn field_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn phone_rule(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("required", "phone is required".to_string()));
    }
    PhoneNumber::new(value)
        .map(|_| ())
        .map_err(|_| field_error("phone", "phone must be exactly 10 digits".to_string()))
}

fn email_rule(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("required", "email is required".to_string()));
    }
    Email::new(value)
        .map(|_| ())
        .map_err(|_| field_error("email", "email must be a valid email address".to_string()))
}

fn password_rule(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(field_error("required", "password is required".to_string()));
    }
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(field_error(
            "length",
            format!("password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    if value.len() > MAX_PASSWORD_BYTES {
        return Err(field_error(
            "length",
            format!("password must be at most {} bytes", MAX_PASSWORD_BYTES),
        ));
    }
    Ok(())
}

fn new_password_rule(value: &str) -> Result<(), ValidationError> {
    password_rule(value).map_err(|e| {
        let message = e
            .message
            .as_deref()
            .unwrap_or_default()
            .replacen("password", "newPassword", 1);
        field_error("newPassword", message)
    })
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterAdminDto {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "name is required"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "username is required"))]
    #[schema(example = "ada")]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "phone_rule"))]
    #[schema(example = "9876543210")]
    pub phone: String,
    #[serde(default)]
    #[validate(custom(function = "email_rule"))]
    #[schema(example = "ada@school.org")]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "password_rule"))]
    #[schema(example = "secret123")]
    pub password: String,
}

impl RegisterAdminDto {
    /// Converts an already validated body into the store's input.
    pub fn into_new_admin(self) -> Result<NewAdmin, ValueTypeError> {
        Ok(NewAdmin {
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            phone: PhoneNumber::new(self.phone)?,
            email: Email::new(self.email)?,
            password: self.password,
        })
    }
}

/// Either `username` or `email` identifies the account.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct LoginAdminDto {
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[schema(example = "ada@school.org")]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

impl LoginAdminDto {
    /// Lookup candidates in order: the trimmed username, then the trimmed
    /// email. Blank values are skipped.
    pub fn identities(&self) -> Vec<&str> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        let mut candidates: Vec<&str> = Vec::with_capacity(2);
        for value in [present(&self.username), present(&self.email)]
            .into_iter()
            .flatten()
        {
            if !candidates.contains(&value) {
                candidates.push(value);
            }
        }
        candidates
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAdminProfileDto {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "email_rule"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "phone_rule"))]
    pub phone: String,
}

impl UpdateAdminProfileDto {
    pub fn into_profile_update(self) -> Result<ProfileUpdate, ValueTypeError> {
        Ok(ProfileUpdate {
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: Email::new(self.email)?,
            phone: PhoneNumber::new(self.phone)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAdminPasswordDto {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "oldPassword is required"))]
    pub old_password: String,
    #[serde(default)]
    #[validate(custom(function = "new_password_rule"))]
    #[schema(example = "newSecret456")]
    pub new_password: String,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginAdminResponse {
    pub user: AdminProfile,
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_dto() -> RegisterAdminDto {
        RegisterAdminDto {
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            phone: "9876543210".to_string(),
            email: "Ada@School.org".to_string(),
            password: "secret123".to_string(),
        }
    }

    fn messages(errors: &validator::ValidationErrors) -> Vec<String> {
        let mut out: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_role_round_trip_text() {
        for role in [Role::Student, Role::Teacher, Role::Admin, Role::Parent] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Admin);
    }

    #[test]
    fn test_register_dto_valid() {
        let dto = register_dto();
        assert!(dto.validate().is_ok());

        let admin = dto.into_new_admin().unwrap();
        assert_eq!(admin.email.as_str(), "ada@school.org");
        assert_eq!(admin.phone.as_str(), "9876543210");
    }

    #[test]
    fn test_register_dto_missing_fields() {
        let dto: RegisterAdminDto = serde_json::from_str(r#"{"username":"ada"}"#).unwrap();
        let errors = dto.validate().unwrap_err();

        assert_eq!(
            messages(&errors),
            vec![
                "email is required",
                "name is required",
                "password is required",
                "phone is required",
            ]
        );
    }

    #[test]
    fn test_register_dto_blank_is_missing() {
        let dto = RegisterAdminDto {
            name: "   ".to_string(),
            ..register_dto()
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(messages(&errors), vec!["name is required"]);
    }

    #[test]
    fn test_register_dto_format_rules() {
        let dto = RegisterAdminDto {
            phone: "12345".to_string(),
            email: "nope".to_string(),
            password: "abc".to_string(),
            ..register_dto()
        };
        let errors = dto.validate().unwrap_err();

        assert_eq!(
            messages(&errors),
            vec![
                "email must be a valid email address",
                "password must be at least 6 characters",
                "phone must be exactly 10 digits",
            ]
        );
    }

    #[test]
    fn test_login_identities_username_then_email() {
        let dto = LoginAdminDto {
            username: Some(" ada ".to_string()),
            email: Some("ada@school.org".to_string()),
            password: "secret123".to_string(),
        };
        assert_eq!(dto.identities(), vec!["ada", "ada@school.org"]);

        let by_email = LoginAdminDto {
            username: Some("".to_string()),
            email: Some("ada@school.org".to_string()),
            password: "secret123".to_string(),
        };
        assert_eq!(by_email.identities(), vec!["ada@school.org"]);

        let same = LoginAdminDto {
            username: Some("ada".to_string()),
            email: Some(" ada ".to_string()),
            password: "secret123".to_string(),
        };
        assert_eq!(same.identities(), vec!["ada"]);

        assert!(LoginAdminDto::default().identities().is_empty());
    }

    #[test]
    fn test_password_longer_than_bcrypt_limit_rejected() {
        let mut dto = RegisterAdminDto {
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            phone: "9876543210".to_string(),
            email: "ada@school.org".to_string(),
            password: "a".repeat(MAX_PASSWORD_BYTES),
        };
        assert!(dto.validate().is_ok());

        dto.password = "a".repeat(MAX_PASSWORD_BYTES + 1);
        let errors = dto.validate().unwrap_err();
        let messages: Vec<String> = errors.field_errors()["password"]
            .iter()
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        assert_eq!(messages, vec!["password must be at most 72 bytes".to_string()]);

        let change = ChangeAdminPasswordDto {
            old_password: "secret123".to_string(),
            new_password: "é".repeat(40),
        };
        assert!(change.validate().is_err());
    }

    #[test]
    fn test_change_password_dto_camel_case() {
        let dto: ChangeAdminPasswordDto =
            serde_json::from_str(r#"{"oldPassword":"secret123","newPassword":"abc"}"#).unwrap();
        assert_eq!(dto.old_password, "secret123");

        let errors = dto.validate().unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["newPassword must be at least 6 characters"]
        );
    }

    #[test]
    fn test_profile_serializes_without_secrets() {
        let now = Utc::now();
        let account = Account {
            id: UserId::new(),
            name: "Ada".to_string(),
            username: "ada".to_string(),
            phone: PhoneNumber::new("9876543210").unwrap(),
            email: Email::new("ada@school.org").unwrap(),
            password_hash: "$2b$10$hash".to_string(),
            role: Role::Admin,
            avatar: String::new(),
            refresh_token: Some("refresh".to_string()),
            created_at: now,
            updated_at: now,
        };

        assert!(!format!("{:?}", account).contains("$2b$"));

        let json = serde_json::to_value(AdminProfile::from(account)).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["email"], "ada@school.org");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("refreshToken").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
