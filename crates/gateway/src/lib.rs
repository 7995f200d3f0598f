//! # Accounts Gateway Crate
//!
//! The HTTP surface of the accounts backend. Form posts go through the
//! account workflow; responses are JSON bodies plus `303 See Other`
//! redirects to the next location.
//!
//! ## Architecture
//!
//! - **REST**: login, registration, dashboard, profile, logout and the
//!   staff directory, with OpenAPI documentation
//! - **State**: the wired workflow and cookie settings
//! - **Middleware**: session gate, request logging, tracing
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn run(pool: accounts_database::Pool) -> std::io::Result<()> {
//! use accounts_config::AuthConfig;
//! use accounts_gateway::{create_router, GatewayState};
//!
//! let state = GatewayState::from_pool(pool, &AuthConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:7070").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use middleware::{require_session, CurrentAccount, CurrentSession, SESSION_COOKIE};
pub use state::GatewayState;

use axum::{middleware as axum_middleware, Router};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    #[allow(unused_mut)]
    let mut router = rest::create_routes(state)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(middleware::create_trace_middleware());

    // Add Swagger UI if in debug mode
    #[cfg(debug_assertions)]
    {
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    router
}

#[cfg(debug_assertions)]
#[derive(OpenApi)]
#[openapi(
    paths(
        rest::accounts::login_form,
        rest::accounts::login,
        rest::accounts::registration_form,
        rest::accounts::register,
        rest::accounts::logout,
        rest::profile::dashboard,
        rest::profile::show_profile,
        rest::profile::edit_profile,
        rest::admin::list_accounts,
        rest::health::health_check,
    ),
    components(
        schemas(
            accounts_users::LoginForm,
            accounts_users::RegistrationForm,
            accounts_users::ProfileForm,
            accounts_users::DashboardView,
            accounts_users::Notification,
            accounts_users::Level,
            rest::FormDescriptor,
            rest::SuccessBody,
            rest::SessionBody,
            rest::admin::AccountSummary,
            rest::health::HealthResponse,
            error::FailureBody,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "Accounts", description = "Login, registration and logout"),
        (name = "Profile", description = "Dashboard and profile editing"),
        (name = "Admin", description = "Staff account directory"),
        (name = "Health", description = "Liveness"),
    )
)]
struct ApiDoc;
