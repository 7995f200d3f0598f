//! Staff-only account directory

use accounts_database::Account;
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::GatewayResult;
use crate::middleware::CurrentAccount;
use crate::state::GatewayState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DirectoryQuery {
    /// Case-insensitive fragment of an email or username
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<String>,
    pub date_joined: String,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.public_id,
            username: account.username,
            email: account.email,
            name: account.name,
            is_active: account.is_active,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            last_login: account.last_login,
            date_joined: account.date_joined,
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/accounts/",
    tag = "Admin",
    params(DirectoryQuery),
    responses(
        (status = 200, description = "Matching accounts ordered by email", body = [AccountSummary]),
        (status = 403, description = "Caller is not staff", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_accounts(
    State(state): State<GatewayState>,
    Extension(CurrentAccount(actor)): Extension<CurrentAccount>,
    Query(query): Query<DirectoryQuery>,
) -> GatewayResult<Json<Vec<AccountSummary>>> {
    let accounts = state
        .workflow()
        .search_accounts(actor.id, &query.q)
        .await?;

    Ok(Json(accounts.into_iter().map(AccountSummary::from).collect()))
}
