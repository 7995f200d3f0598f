//! Dashboard and profile endpoints; both require a session

use accounts_users::{DashboardView, ProfileForm};
use axum::{extract::State, response::Response, Extension, Form, Json};
use axum_extra::extract::cookie::CookieJar;

use super::{see_other, SuccessBody};
use crate::error::{GatewayError, GatewayResult};
use crate::middleware::CurrentAccount;
use crate::state::GatewayState;

#[utoipa::path(
    get,
    path = "/dashboard/",
    tag = "Profile",
    responses(
        (status = 200, description = "Landing page for a logged-in account", body = DashboardView),
        (status = 303, description = "No session; redirected to login")
    )
)]
pub async fn dashboard(
    State(state): State<GatewayState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> GatewayResult<Json<DashboardView>> {
    let view = state.workflow().dashboard(account.id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/profile/",
    tag = "Profile",
    responses(
        (status = 200, description = "Current profile values", body = ProfileForm),
        (status = 303, description = "No session; redirected to login")
    )
)]
pub async fn show_profile(
    State(state): State<GatewayState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> GatewayResult<Json<ProfileForm>> {
    let form = state.workflow().profile(account.id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/profile/",
    tag = "Profile",
    request_body(content = ProfileForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Profile saved", body = SuccessBody),
        (status = 422, description = "Field errors; nothing saved", body = crate::error::FailureBody)
    )
)]
pub async fn edit_profile(
    State(state): State<GatewayState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Form(form): Form<ProfileForm>,
) -> GatewayResult<Response> {
    let outcome = state
        .workflow()
        .edit_profile(account.id, &form)
        .await
        .map_err(|error| GatewayError::from_workflow(error, form.echo()))?;

    let body = SuccessBody {
        messages: outcome.messages,
        redirect: outcome.redirect.to_owned(),
        session: None,
    };

    Ok(see_other(CookieJar::new(), outcome.redirect, body))
}
