//! Account records exchanged with the `/api/auth` endpoints.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A user account as listed by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub id_usuario: DbId,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub rol: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Payload for `POST /api/auth/register`.
///
/// The lookup endpoints also answer with this shape (minus a usable
/// password), so it derives `Deserialize` as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub rol: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUserRequest {
    pub email: String,
    pub password: String,
}

/// Token grant returned by login, register and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime of `access_token` in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}
