//! Session gate, session cookies and request logging

use accounts_auth::SessionToken;
use accounts_database::Account;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, Level};

use crate::error::GatewayError;
use crate::state::GatewayState;

pub const SESSION_COOKIE: &str = "sessionid";

/// The authenticated account, inserted by [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// The token the current request authenticated with
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionToken);

/// Token from `Authorization: Bearer`, falling back to the session cookie
pub fn presented_token(headers: &HeaderMap, jar: &CookieJar) -> Option<SessionToken> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(SessionToken::new(token));
    }

    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(SessionToken::new)
}

/// Reject requests without a live session by redirecting to the login page
pub async fn require_session(
    State(state): State<GatewayState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = presented_token(request.headers(), &jar) else {
        return login_redirect(request.uri());
    };

    match state.workflow().current_account(&token).await {
        Ok(Some(account)) => {
            request.extensions_mut().insert(CurrentAccount(account));
            request.extensions_mut().insert(CurrentSession(token));
            next.run(request).await
        }
        Ok(None) => {
            debug!(path = request.uri().path(), "stale session presented");
            login_redirect(request.uri())
        }
        Err(error) => GatewayError::from(error).into_response(),
    }
}

fn login_redirect(uri: &Uri) -> Response {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    Redirect::to(&format!("/?next={}", urlencoding::encode(next))).into_response()
}

/// Accept a post-login destination only if it stays on this site.
///
/// Browsers drop tab, CR and LF from a `Location` value, so a path carrying
/// control characters could collapse into `//host`; those are refused too.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|path| {
        path.starts_with('/')
            && !path.starts_with("//")
            && !path.contains('\\')
            && !path.chars().any(|c| c.is_ascii_control())
    })
}

pub fn session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.as_str().to_owned()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build()
}

/// Cookie matching [`session_cookie`]'s name and path, for removal
pub fn session_cookie_removal() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Create tracing middleware
pub fn create_trace_middleware() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}

/// Logging middleware for request/response logging
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "from-cookie"));

        assert_eq!(
            presented_token(&headers, &jar).map(SessionToken::into_inner),
            Some("abc".to_string())
        );
        assert_eq!(
            presented_token(&HeaderMap::new(), &jar).map(SessionToken::into_inner),
            Some("from-cookie".to_string())
        );
        assert!(presented_token(&HeaderMap::new(), &CookieJar::new()).is_none());
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/profile/")), Some("/profile/"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("/\t/evil.example")), None);
        assert_eq!(safe_next(Some("/\n/evil.example")), None);
        assert_eq!(safe_next(Some("/profile/\r")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&SessionToken::new("tok"), true);
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("sessionid=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Secure"));
    }

    #[test]
    fn test_login_redirect_keeps_destination() {
        let response = login_redirect(&Uri::from_static("/admin/accounts/?q=bob"));
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/?next=%2Fadmin%2Faccounts%2F%3Fq%3Dbob");
    }
}
