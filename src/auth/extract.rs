use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tracing::debug;

use super::Principal;
use crate::{
    error::AppError,
    state::{AppState, SharedState},
};

/// Identity of the caller, resolved from the auth cookie or a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedPlayer(pub Principal);

impl FromRequestParts<SharedState> for AuthenticatedPlayer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).map(Self)
    }
}

/// Verify the credential carried by `headers`.
pub fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Principal, AppError> {
    let token = bearer_token(headers)
        .or_else(|| cookie_value(headers, &state.config().auth_cookie))
        .ok_or_else(|| AppError::Unauthenticated("missing credentials".into()))?;

    state.verifier().verify(token).map_err(|err| {
        debug!(error = %err, "credential rejected");
        AppError::Unauthenticated("invalid or expired credentials".into())
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=en"),
        );
        assert_eq!(cookie_value(&headers, "token"), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "session"), None);
    }

    #[test]
    fn reads_bearer_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
