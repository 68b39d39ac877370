use axum::{Json, extract::State};
use std::sync::Arc;

use super::auth::Principal;
use super::{ApiError, ApiResponse, AppState};
use crate::models::SignupPolicy;
use crate::services::SetConfigOutcome;

/// GET /spv1/admin/signup-policy
pub async fn get_signup_policy(
    State(state): State<Arc<AppState>>,
    _principal: Principal,
) -> Result<Json<ApiResponse<SignupPolicy>>, ApiError> {
    let policy = state
        .shared
        .config_gate
        .signup_policy()
        .await?
        .ok_or_else(|| ApiError::NotFound("No signup configuration".to_string()))?;

    Ok(Json(ApiResponse::success(policy)))
}

/// PUT /spv1/admin/signup-policy
pub async fn put_signup_policy(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(policy): Json<SignupPolicy>,
) -> Result<Json<ApiResponse<SignupPolicy>>, ApiError> {
    if policy.min_signup_delay_seconds > policy.max_signup_delay_seconds {
        return Err(ApiError::validation(
            "minSignupSeconds cannot exceed maxSignupSeconds",
        ));
    }

    match state
        .shared
        .config_gate
        .set_signup_policy(&principal.login_id, policy)
        .await?
    {
        SetConfigOutcome::Updated(_) => Ok(Json(ApiResponse::success(policy))),
        SetConfigOutcome::Forbidden => Err(ApiError::Forbidden(
            "The admin role is required".to_string(),
        )),
        SetConfigOutcome::UnknownLogin => Err(ApiError::unauthorized("Unknown login")),
    }
}
