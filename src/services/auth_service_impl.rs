//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store};
use crate::db::repositories::user::generate_reset_code;
use crate::models::user::{ProfilePatch, User};
use crate::services::auth_service::{AuthError, AuthService, AuthSession, RegisterInput};
use crate::services::email::Mailer;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    mailer: Option<Arc<Mailer>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(
        store: Store,
        security: SecurityConfig,
        mailer: Option<Arc<Mailer>>,
    ) -> Self {
        Self {
            store,
            security,
            mailer,
        }
    }

    fn check_password_strength(&self, password: &str) -> Result<(), AuthError> {
        if password.len() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "La contraseña debe tener al menos {} caracteres",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("El email no es válido".to_string()));
        }
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AuthError::Validation("El nombre es requerido".to_string()));
        }
        self.check_password_strength(&input.password)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let (user, token) = self
            .store
            .create_user(
                NewUser {
                    name,
                    email,
                    password: input.password,
                    role: input.role,
                    phone: input.phone,
                    address: input.address,
                },
                &self.security,
            )
            .await?;

        info!(user_id = user.id, "User registered");

        Ok(AuthSession { user, token })
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email);

        let is_valid = self
            .store
            .verify_user_password_by_email(&email, password)
            .await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self
            .store
            .user_access_token(user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(AuthSession { user, token })
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        Ok(self.store.find_user_by_token(token).await?)
    }

    async fn current_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        patch: ProfilePatch,
    ) -> Result<User, AuthError> {
        if let Some(name) = &patch.name
            && name.trim().is_empty()
        {
            return Err(AuthError::Validation(
                "El nombre no puede estar vacío".to_string(),
            ));
        }

        self.store
            .update_user_profile(user_id, patch)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.check_password_strength(new_password)?;

        let is_valid = self
            .store
            .verify_user_password(user_id, current_password)
            .await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;

        info!(user_id, "Password changed");

        Ok(())
    }

    async fn delete_account(&self, user_id: i32) -> Result<(), AuthError> {
        if !self.store.delete_user(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id, "Account deleted");

        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            // Deliberately indistinguishable from the success path
            return Ok(());
        };

        let code = generate_reset_code();
        let expires_at = (chrono::Utc::now()
            + chrono::Duration::minutes(self.security.reset_code_ttl_minutes))
        .to_rfc3339();

        self.store
            .set_reset_token(user.id, &code, &expires_at)
            .await?;

        // Delivery must never block or fail the request
        if let Some(mailer) = &self.mailer {
            let mailer = Arc::clone(mailer);
            let name = user.name.clone();
            tokio::spawn(async move {
                if mailer.send_reset_email(&email, &code, &name).await {
                    info!("Password reset email sent to {email}");
                } else {
                    warn!("Failed to send password reset email to {email}");
                }
            });
        } else {
            info!("Email delivery disabled; reset code issued for {email}");
        }

        Ok(())
    }

    async fn reset_password(&self, code: &str, new_password: &str) -> Result<(), AuthError> {
        self.check_password_strength(new_password)?;

        let Some((user, expires_at)) = self.store.find_user_by_reset_code(code).await? else {
            return Err(AuthError::InvalidResetCode);
        };

        let expired = chrono::DateTime::parse_from_rfc3339(&expires_at)
            .map(|t| t.with_timezone(&chrono::Utc) < chrono::Utc::now())
            .unwrap_or(true);
        if expired {
            return Err(AuthError::InvalidResetCode);
        }

        self.store
            .consume_reset_token(user.id, new_password, &self.security)
            .await?;

        info!(user_id = user.id, "Password reset completed");

        Ok(())
    }
}
