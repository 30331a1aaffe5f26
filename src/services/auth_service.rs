//! Domain service for registration, login and credential management.

use thiserror::Error;

use crate::models::user::{ProfilePatch, Role, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("El usuario ya existe")]
    EmailTaken,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Token inválido o expirado")]
    InvalidResetCode,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration input as accepted from the wire.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Authenticated identity handed back by register/login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Domain service trait for authentication and account management.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and returns its session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] when the email is already
    /// registered and [`AuthError::Validation`] for malformed input.
    async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError>;

    /// Verifies credentials and returns the session.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Resolves a Bearer access token to its user, if any.
    async fn resolve_token(&self, token: &str) -> Result<Option<User>, AuthError>;

    async fn current_user(&self, user_id: i32) -> Result<User, AuthError>;

    async fn update_profile(&self, user_id: i32, patch: ProfilePatch)
    -> Result<User, AuthError>;

    /// Changes a password after verifying the current one.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    async fn delete_account(&self, user_id: i32) -> Result<(), AuthError>;

    /// Issues a reset code for the account, if it exists, and mails it out
    /// without blocking. Always succeeds from the caller's perspective so
    /// the endpoint cannot be used to enumerate accounts.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Consumes a reset code and sets the new password.
    async fn reset_password(&self, code: &str, new_password: &str) -> Result<(), AuthError>;
}
