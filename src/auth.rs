//! Caller identity.
//!
//! Tokens are verified by the API Gateway authorizer before a handler runs;
//! handlers only need the owner id carried in the token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use lambda_http::http::header::AUTHORIZATION;
use lambda_http::Request;
use serde::Deserialize;

use crate::common::{Result, TodoError};

pub trait IdentityVerifier: Send + Sync {
    /// Returns the owner id for an already verified bearer token.
    fn user_id(&self, token: &str) -> Result<String>;
}

/// Reads the `sub` claim of a JWT.
#[derive(Debug, Default, Clone, Copy)]
pub struct JwtSubject;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

impl IdentityVerifier for JwtSubject {
    fn user_id(&self, token: &str) -> Result<String> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| TodoError::Auth("Malformed token".into()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|err| TodoError::Auth(format!("Invalid token payload: {err}")))?;
        let claims: Claims = serde_json::from_slice(&bytes)
            .map_err(|err| TodoError::Auth(format!("Invalid token claims: {err}")))?;

        if claims.sub.is_empty() {
            return Err(TodoError::Auth("Token has no subject".into()));
        }

        Ok(claims.sub)
    }
}

pub fn bearer_token(request: &Request) -> Result<&str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| TodoError::Auth("Missing authorization header".into()))?
        .to_str()
        .map_err(|_| TodoError::Auth("Invalid authorization header".into()))?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(TodoError::Auth("Expected a bearer token".into())),
    }
}

#[cfg(test)]
pub(crate) fn token_for(user_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": user_id }).to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use lambda_http::Body;

    use super::*;

    fn request_with_auth(value: &str) -> Request {
        lambda_http::http::Request::builder()
            .header(AUTHORIZATION, value)
            .body(Body::Empty)
            .unwrap()
    }

    #[test]
    fn test_subject_is_extracted() {
        let token = token_for("google-oauth2|1234");
        assert_eq!(JwtSubject.user_id(&token).unwrap(), "google-oauth2|1234");
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        assert!(matches!(JwtSubject.user_id("not-a-jwt"), Err(TodoError::Auth(_))));
        assert!(matches!(JwtSubject.user_id("a.!!!.c"), Err(TodoError::Auth(_))));

        let no_sub = format!("h.{}.s", URL_SAFE_NO_PAD.encode(r#"{"iss":"x"}"#));
        assert!(matches!(JwtSubject.user_id(&no_sub), Err(TodoError::Auth(_))));
    }

    #[test]
    fn test_bearer_token() {
        let request = request_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&request).unwrap(), "abc.def.ghi");

        assert!(bearer_token(&request_with_auth("Basic dXNlcg==")).is_err());
        assert!(bearer_token(&request_with_auth("Bearer ")).is_err());
        assert!(bearer_token(&Request::new(Body::Empty)).is_err());
    }
}
