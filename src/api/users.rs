use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{AuthUser, MessageResponse};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::models::user::ProfilePatch;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .auth_service()
        .update_profile(
            auth.id,
            ProfilePatch {
                name: payload.nombre,
                phone: payload.telefono,
                address: payload.direccion,
                avatar_url: payload.avatar,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Perfil actualizado exitosamente",
        UserDto::from(user),
    )))
}

/// PUT /api/users/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::validation(
            "Por favor proporciona la contraseña actual y la nueva",
        ));
    }

    state
        .auth_service()
        .change_password(auth.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Contraseña actualizada exitosamente".to_string(),
    })))
}

/// DELETE /api/users/delete-account
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    session: Session,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().delete_account(auth.id).await?;

    let _ = session.flush().await;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Cuenta eliminada exitosamente".to_string(),
    })))
}
