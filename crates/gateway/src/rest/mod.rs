//! HTTP endpoints for the gateway

pub mod accounts;
pub mod admin;
pub mod health;
pub mod profile;

use accounts_users::Notification;
use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::middleware::require_session;
use crate::state::GatewayState;

/// Body of a successful form submission
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessBody {
    pub messages: Vec<Notification>,
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionBody>,
}

/// Session details for clients that send `Authorization: Bearer`
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionBody {
    pub token: String,
    pub expires_at: String,
}

/// What a client needs to render a form
#[derive(Debug, Serialize, ToSchema)]
pub struct FormDescriptor {
    pub action: String,
    pub method: String,
    pub fields: Vec<String>,
}

impl FormDescriptor {
    fn post(action: &str, fields: &[&str]) -> Self {
        Self {
            action: action.to_owned(),
            method: "POST".to_owned(),
            fields: fields.iter().map(|field| (*field).to_owned()).collect(),
        }
    }
}

/// 303 to `location` with the outcome in the body
pub(crate) fn see_other(jar: CookieJar, location: &str, body: SuccessBody) -> Response {
    (
        StatusCode::SEE_OTHER,
        jar,
        [(header::LOCATION, location.to_owned())],
        Json(body),
    )
        .into_response()
}

/// Create all routes; everything but login, registration and health sits
/// behind the session gate
pub fn create_routes(state: GatewayState) -> Router {
    let public = Router::new()
        .route("/", get(accounts::login_form).post(accounts::login))
        .route(
            "/register/",
            get(accounts::registration_form).post(accounts::register),
        )
        .route("/health", get(health::health_check));

    let gated = Router::new()
        .route("/dashboard/", get(profile::dashboard))
        .route("/profile/", get(profile::show_profile).post(profile::edit_profile))
        .route("/logout/", get(accounts::logout).post(accounts::logout))
        .route("/admin/accounts/", get(admin::list_accounts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    public.merge(gated).with_state(state)
}
