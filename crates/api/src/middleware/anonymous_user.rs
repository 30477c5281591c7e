//! Anonymous user identification through a long-lived cookie.
//!
//! There are no accounts. Every browser gets a random id on its first
//! request; ideas and ideation sessions are attributed to that id.

use axum::extract::{FromRequestParts, Request};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::error::AppError;

/// Name of the cookie carrying the anonymous id.
pub const USER_ID_COOKIE: &str = "anonymous-user-id";

/// Cookie lifetime: ten years.
pub const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365 * 10;

/// Longest cookie value accepted as an id.
const MAX_ID_LENGTH: usize = 64;

/// The caller's anonymous id, placed in request extensions by
/// [`assign_anonymous_user`].
///
/// ```ignore
/// async fn my_handler(user: AnonymousUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousUser {
    pub id: String,
}

/// Read the anonymous id from the `Cookie` headers, ignoring values that
/// could not have been issued by this service.
pub fn user_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USER_ID_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| is_valid_id(value))
        .map(str::to_string)
}

fn is_valid_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_ID_LENGTH
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `Set-Cookie` value for a freshly issued id.
pub fn issue_cookie(id: &str) -> String {
    format!("{USER_ID_COOKIE}={id}; HttpOnly; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Lax")
}

/// Ensure every request carries an anonymous id.
///
/// An existing cookie is reused. Otherwise a v4 UUID is issued: it is made
/// available to the current request and set on the response.
pub async fn assign_anonymous_user(mut request: Request, next: Next) -> Response {
    let (id, issued) = match user_id_from_headers(request.headers()) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    if issued {
        tracing::info!(user_id = %id, "New anonymous user identified");
    }

    request
        .extensions_mut()
        .insert(AnonymousUser { id: id.clone() });
    let mut response = next.run(request).await;

    if issued {
        if let Ok(value) = HeaderValue::from_str(&issue_cookie(&id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

impl<S> FromRequestParts<S> for AnonymousUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AnonymousUser>()
            .cloned()
            .ok_or_else(|| {
                AppError::InternalError("Anonymous user middleware is not installed".into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn finds_cookie_among_others() {
        let h = headers("theme=dark; anonymous-user-id=4f1c2a9e-0000-4000-8000-000000000001; x=y");
        assert_eq!(
            user_id_from_headers(&h).as_deref(),
            Some("4f1c2a9e-0000-4000-8000-000000000001")
        );
    }

    #[test]
    fn missing_or_malformed_cookie_is_ignored() {
        assert_eq!(user_id_from_headers(&HeaderMap::new()), None);
        assert_eq!(user_id_from_headers(&headers("theme=dark")), None);
        assert_eq!(user_id_from_headers(&headers("anonymous-user-id=")), None);
        assert_eq!(user_id_from_headers(&headers("anonymous-user-id=a b")), None);
        assert_eq!(
            user_id_from_headers(&headers(&format!("anonymous-user-id={}", "a".repeat(65)))),
            None
        );
    }

    #[test]
    fn issued_cookie_attributes() {
        let cookie = issue_cookie("abc");
        assert!(cookie.starts_with("anonymous-user-id=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=315360000"));
        assert!(cookie.contains("SameSite=Lax"));
    }
}
