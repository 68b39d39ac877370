use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::types::{AccountInfoResponse, LoginAccountResponse, LoginRequest, TokenResponse};
use super::validation::{validate_login_id, validate_password};
use super::{ApiError, ApiResponse, AppState};
use crate::services::{LoginOutcome, TokenVerdict};

/// The login a request acts for, taken from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub login_id: String,
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}

/// Attaches a [`Principal`] when the request carries a valid session token.
///
/// Requests without one pass through anonymously; handlers that need a
/// principal reject them.
pub async fn bearer_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.shared.tokens.verify(token) {
            TokenVerdict::Valid(claims) => {
                if let Some(login_id) = claims.sub {
                    tracing::Span::current().record("login_id", login_id.as_str());
                    request.extensions_mut().insert(Principal { login_id });
                }
            }
            TokenVerdict::Invalid(reason) => {
                tracing::debug!(reason = reason.as_str(), "Ignoring invalid bearer token");
            }
        }
    }

    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// POST /spv1/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    validate_login_id(&payload.login_id)?;
    validate_password(&payload.password)?;

    match state
        .shared
        .auth_service
        .login(&payload.login_id, &payload.password)
        .await?
    {
        LoginOutcome::LoggedIn { token } => Ok(Json(ApiResponse::success(TokenResponse { token }))),
        LoginOutcome::Rejected => Err(ApiError::unauthorized("Invalid credentials")),
        LoginOutcome::NotFound => Err(ApiError::not_found("Login", &payload.login_id)),
    }
}

/// GET /spv1/login-account
pub async fn login_account(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<LoginAccountResponse>>, ApiError> {
    let login = state
        .shared
        .store
        .logins()
        .get(&principal.login_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Login", &principal.login_id))?;

    Ok(Json(ApiResponse::success(LoginAccountResponse {
        login_id: login.id,
        created: login.created.to_rfc3339(),
    })))
}

/// GET /spv1/account-info
pub async fn account_info(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<AccountInfoResponse>>, ApiError> {
    let account = state
        .shared
        .auth_service
        .account(&principal.login_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Login", &principal.login_id))?;

    Ok(Json(ApiResponse::success(account.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
