use serde::{Serialize, Deserialize};
use validator::Validate;

pub mod utils;

/// Snapshot of an authenticated account as reported by the identity
/// backend. Cached into the session and render context; the backend
/// stays the source of truth.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Form fields posted to `/login`.
#[derive(Serialize, Deserialize, Clone, Debug, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter your password"))]
    pub password: String,
}

/// Form fields posted to `/register`. Confirmation matching is a
/// precondition checked before any backend call.
#[derive(Serialize, Deserialize, Clone, Debug, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}

/// Form fields posted to `/account`.
#[derive(Serialize, Deserialize, Clone, Debug, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, message = "Display name cannot be empty"))]
    pub display_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

/// Form fields posted to `/password`.
#[derive(Serialize, Deserialize, Clone, Debug, Validate)]
pub struct PasswordForm {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}
