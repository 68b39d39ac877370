use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{Extensions, HeaderMap, StatusCode},
};
use std::net::SocketAddr;
use std::sync::Arc;

use super::types::{SignupBody, SignupCreatedResponse, SignupTokenResponse};
use super::validation::{validate_login_id, validate_password, validate_pun};
use super::{ApiError, ApiResponse, AppState};
use crate::services::{SignupOutcome, SignupRequest, SignupTokenOutcome};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// The requester's address: the first `X-Forwarded-For` entry when trusted,
/// otherwise the socket peer.
fn source_address(headers: &HeaderMap, extensions: &Extensions, trust_forwarded: bool) -> String {
    if trust_forwarded
        && let Some(first) = headers
            .get(FORWARDED_FOR)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ci| ci.0.ip().to_string())
}

/// GET /spv1/signup-token
pub async fn signup_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    extensions: Extensions,
) -> Result<Json<ApiResponse<SignupTokenResponse>>, ApiError> {
    let source = source_address(
        &headers,
        &extensions,
        state.shared.config.server.trust_forwarded_for,
    );

    match state.shared.signup_service.issue_signup_token(&source).await? {
        SignupTokenOutcome::Issued {
            token,
            open_registration,
        } => Ok(Json(ApiResponse::success(SignupTokenResponse {
            token,
            open_registration,
        }))),
        SignupTokenOutcome::NotConfigured => Err(ApiError::internal("No signup configuration")),
    }
}

/// POST /spv1/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<ApiResponse<SignupCreatedResponse>>), ApiError> {
    validate_login_id(&body.login_id)?;
    validate_password(&body.password)?;
    validate_pun(body.pun.as_deref().unwrap_or(&body.login_id))?;

    let request = SignupRequest {
        login_id: body.login_id,
        pun: body.pun,
        password: body.password,
        email: body.email,
        token: body.token,
    };

    match state.shared.signup_service.signup(request).await? {
        SignupOutcome::Created {
            login_id,
            pun,
            confirmation_required,
            email,
        } => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(SignupCreatedResponse {
                login_id,
                pun,
                confirmation_required,
                email,
            })),
        )),
        SignupOutcome::Conflict { reason } => Err(ApiError::Conflict(reason)),
        SignupOutcome::RegistrationClosed => {
            Err(ApiError::unauthorized("Open registration is closed"))
        }
        SignupOutcome::InvalidToken { reason } => Err(ApiError::unauthorized(format!(
            "Invalid signup token: {}",
            reason.as_str()
        ))),
        SignupOutcome::NotConfigured => Err(ApiError::internal("No signup configuration")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_only_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));

        assert_eq!(source_address(&headers, &extensions, true), "203.0.113.7");
        assert_eq!(source_address(&headers, &extensions, false), "192.0.2.1");
        assert_eq!(
            source_address(&HeaderMap::new(), &Extensions::new(), true),
            "unknown"
        );
    }
}
