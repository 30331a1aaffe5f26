use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, SessionDto, UserDto};
use crate::domain::policy::Actor;
use crate::models::user::{Role, User};
use crate::services::RegisterInput;

const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub rol: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// The authenticated principal, attached to the request by the middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i32,
    pub role: Role,
}

impl AuthUser {
    #[must_use]
    pub const fn actor(self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `Authorization: Bearer <token>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Check session first (fastest path for browser clients)
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await
        && let Ok(Some(user)) = state.store().find_user_by_id(user_id).await
    {
        tracing::Span::current().record("user_id", user.id);
        request.extensions_mut().insert(AuthUser::from(&user));
        return Ok(next.run(request).await);
    }

    let Some(token) = extract_bearer_token(&headers) else {
        return Err(ApiError::Unauthorized(
            "No autorizado, no hay token".to_string(),
        ));
    };

    let user = state
        .auth_service()
        .resolve_token(&token)
        .await
        .map_err(ApiError::from)?;

    let Some(user) = user else {
        return Err(ApiError::Unauthorized(
            "No autorizado, token inválido".to_string(),
        ));
    };

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(AuthUser::from(&user));
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionDto>>), ApiError> {
    let Some(role) = Role::parse(&payload.rol) else {
        return Err(ApiError::validation(format!(
            "Rol no válido: {}",
            payload.rol
        )));
    };

    let session = state
        .auth_service()
        .register(RegisterInput {
            name: payload.nombre,
            email: payload.email,
            password: payload.password,
            role,
            phone: payload.telefono,
            address: payload.direccion,
        })
        .await?;

    let body = ApiResponse::with_message(
        "Usuario registrado exitosamente",
        SessionDto {
            id: session.user.id,
            nombre: session.user.name,
            email: session.user.email,
            rol: session.user.role,
            token: session.token,
        },
    );

    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation(
            "Por favor proporciona email y contraseña",
        ));
    }

    let auth = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    if let Err(e) = session.insert(SESSION_USER_KEY, auth.user.id).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    Ok(Json(ApiResponse::with_message(
        "Login exitoso",
        SessionDto {
            id: auth.user.id,
            nombre: auth.user.name,
            email: auth.user.email,
            rol: auth.user.role,
            token: auth.token,
        },
    )))
}

/// POST /api/auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse {
        message: "Sesión cerrada".to_string(),
    }))
}

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.auth_service().current_user(auth.id).await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /api/auth/forgot-password
///
/// Always answers with the same message so the endpoint cannot be used to
/// probe which emails are registered.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("El email es requerido"));
    }

    state.auth_service().forgot_password(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Si el correo está registrado, se envió un código de recuperación".to_string(),
    })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::validation("El token es requerido"));
    }

    state
        .auth_service()
        .reset_password(&payload.token, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Contraseña actualizada exitosamente".to_string(),
    })))
}
