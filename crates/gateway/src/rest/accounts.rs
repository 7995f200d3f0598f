//! Login, registration and logout endpoints

use accounts_users::{locations, LoginForm, RegistrationForm};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    Extension, Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use utoipa::IntoParams;

use super::{see_other, FormDescriptor, SessionBody, SuccessBody};
use crate::error::{GatewayError, GatewayResult};
use crate::middleware::{
    presented_token, safe_next, session_cookie, session_cookie_removal, CurrentSession,
};
use crate::state::GatewayState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Local path to continue to after logging in
    pub next: Option<String>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Accounts",
    responses(
        (status = 200, description = "Login form fields", body = FormDescriptor)
    )
)]
pub async fn login_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post(locations::LOGIN, &["username", "password"]))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Accounts",
    params(LoginQuery),
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in; session cookie set", body = SuccessBody),
        (status = 401, description = "Credentials rejected", body = crate::error::FailureBody)
    )
)]
pub async fn login(
    State(state): State<GatewayState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> GatewayResult<Response> {
    let presented = presented_token(&headers, &jar);

    let outcome = state
        .workflow()
        .login(&form, presented.as_ref())
        .await
        .map_err(|error| GatewayError::from_workflow(error, form.echo()))?;

    let session = outcome.value;
    let location = safe_next(query.next.as_deref())
        .unwrap_or(outcome.redirect)
        .to_owned();
    let jar = jar.add(session_cookie(&session.token, state.cookie_secure()));

    let body = SuccessBody {
        messages: outcome.messages,
        redirect: location.clone(),
        session: Some(SessionBody {
            token: session.token.into_inner(),
            expires_at: session.expires_at.to_rfc3339(),
        }),
    };

    Ok(see_other(jar, &location, body))
}

#[utoipa::path(
    get,
    path = "/register/",
    tag = "Accounts",
    responses(
        (status = 200, description = "Registration form fields", body = FormDescriptor)
    )
)]
pub async fn registration_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post(
        locations::REGISTER,
        &[
            "username",
            "password",
            "password_confirmation",
            "email",
            "address",
            "phone_number",
            "name",
        ],
    ))
}

#[utoipa::path(
    post,
    path = "/register/",
    tag = "Accounts",
    request_body(content = RegistrationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created", body = SuccessBody),
        (status = 422, description = "Field errors", body = crate::error::FailureBody)
    )
)]
pub async fn register(
    State(state): State<GatewayState>,
    Form(form): Form<RegistrationForm>,
) -> GatewayResult<Response> {
    let outcome = state
        .workflow()
        .register(&form)
        .await
        .map_err(|error| GatewayError::from_workflow(error, form.echo()))?;

    let body = SuccessBody {
        messages: outcome.messages,
        redirect: outcome.redirect.to_owned(),
        session: None,
    };

    Ok(see_other(CookieJar::new(), outcome.redirect, body))
}

#[utoipa::path(
    post,
    path = "/logout/",
    tag = "Accounts",
    responses(
        (status = 303, description = "Session destroyed; cookie cleared", body = SuccessBody),
        (status = 500, description = "Session store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<GatewayState>,
    Extension(CurrentSession(token)): Extension<CurrentSession>,
    jar: CookieJar,
) -> GatewayResult<Response> {
    let outcome = state.workflow().logout(&token).await?;

    let body = SuccessBody {
        messages: outcome.messages,
        redirect: outcome.redirect.to_owned(),
        session: None,
    };

    Ok(see_other(
        jar.remove(session_cookie_removal()),
        outcome.redirect,
        body,
    ))
}
