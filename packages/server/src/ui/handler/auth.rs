//! Request authentication shared by the WebSocket upgrade and the HTTP API.
//!
//! 認証情報は `Authorization: Bearer <token>` を優先し、なければ `?token=` を使う。
//! 失敗した場合は 401 `{"error":"Unauthorized"}` を返す。

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::Response,
};
use serde::Deserialize;

use crate::{
    domain::{Credentials, UserId},
    ui::state::AppState,
};

use super::http::error_response;

/// `?token=` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Resolve credentials: `Authorization: Bearer <token>` first, then `?token=`.
pub fn extract_credentials(headers: &HeaderMap, query: TokenQuery) -> Credentials {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    Credentials {
        token: bearer.or(query.token),
    }
}

/// Resolve `credentials` to a user, or build the 401 response.
pub async fn authenticate(state: &AppState, credentials: &Credentials) -> Result<UserId, Response> {
    state.authenticator.authenticate(credentials).await.map_err(|e| {
        tracing::warn!(error = %e, "Rejecting unauthenticated request");
        error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
    })
}

/// Extractor for the user behind an authenticated HTTP request
///
/// ```rust,ignore
/// async fn handler(AuthenticatedUser(user_id): AuthenticatedUser) { /* ... */ }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // クエリが壊れていてもヘッダーだけで認証できるようにする
        let query = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();
        let credentials = extract_credentials(&parts.headers, query);
        authenticate(state, &credentials).await.map(Self)
    }
}
