//! `/api/auth` endpoints: login, registration, token refresh, account
//! lookup and admin user management.

use std::sync::Arc;

use sentinel_core::auth::{
    ChangePasswordRequest, LoginResponse, LoginUserRequest, RefreshRequest, RegisterUserRequest,
    UserData,
};
use sentinel_core::types::DbId;

use crate::http::{require, ApiClient, ApiError};

const BASE_PATH: &str = "/api/auth";

pub struct AuthService {
    http: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    fn path(sub: &str) -> String {
        format!("{BASE_PATH}{sub}")
    }

    /// Look up an account by email; the endpoint answers with a list and
    /// the first entry wins.
    pub async fn user_by_email(&self, email: &str) -> Result<Option<RegisterUserRequest>, ApiError> {
        let users: Option<Vec<RegisterUserRequest>> = self
            .http
            .get(&Self::path("/users"), &[("email", email.to_string())], false)
            .await?;
        Ok(users.and_then(|list| list.into_iter().next()))
    }

    pub async fn user_by_id(&self, id: DbId) -> Result<Option<RegisterUserRequest>, ApiError> {
        self.http
            .get(&Self::path("/users"), &[("id", id.to_string())], false)
            .await
    }

    /// All accounts (admin).
    pub async fn list_users(&self) -> Result<Vec<UserData>, ApiError> {
        let users = self.http.get(&Self::path("/users"), &[], true).await?;
        Ok(users.unwrap_or_default())
    }

    /// Remove an account (admin).
    pub async fn delete_user(&self, id: DbId) -> Result<(), ApiError> {
        self.http
            .delete::<serde_json::Value>(&Self::path(&format!("/users/{id}")), &[], true)
            .await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn register(&self, payload: &RegisterUserRequest) -> Result<LoginResponse, ApiError> {
        let resp = self
            .http
            .post(&Self::path("/register"), payload, false)
            .await?;
        require(resp, "registration response")
    }

    /// Exchange credentials for a token grant.
    ///
    /// A grant without an access token is treated as an invalid answer.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let payload = LoginUserRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: Option<LoginResponse> =
            self.http.post(&Self::path("/login"), &payload, false).await?;

        match resp {
            Some(grant) if !grant.access_token.is_empty() => Ok(grant),
            _ => Err(ApiError::EmptyResponse("access token")),
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResponse, ApiError> {
        let payload = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let resp = self
            .http
            .post(&Self::path("/refresh"), &payload, false)
            .await?;
        require(resp, "refresh response")
    }

    pub async fn change_password(&self, payload: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.http
            .post::<serde_json::Value, _>(&Self::path("/change-password"), payload, false)
            .await?;
        Ok(())
    }

    /// Whether a password-reset token is still valid.
    ///
    /// Any failure, including network errors, counts as invalid.
    pub async fn validate_reset_token(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        match self
            .http
            .get::<serde_json::Value>(
                &Self::path("/reset-password/validate"),
                &[("token", token.to_string())],
                false,
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Reset token rejected");
                false
            }
        }
    }
}
