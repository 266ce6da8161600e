use crate::{
    api::{
        auth::{require_token, TOKEN_HEADER},
        error::{method_not_allowed, ApiError, Error, Json},
        AppState,
    },
    domain::{Account, AccountRepository, NewAccount},
};
use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    Extension,
    routing::{get, post},
    Router,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{OpenApi, ToSchema};

#[derive(OpenApi)]
#[openapi(
    paths(list_accounts, create_account, get_account, delete_account, transfer),
    components(schemas(Account, CreateAccountRequest, TransferRequest, Deleted, ApiError))
)]
pub struct ApiDoc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
}

/// Transfers are accepted and echoed, but not applied to any balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to_account: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Deleted {
    pub deleted: i64,
}

pub fn app<R>(app_state: AppState<R>) -> Router<AppState<R>>
where
    R: AccountRepository,
{
    let protected = Router::new()
        .route(
            "/account/:id",
            get(get_account)
                .delete(delete_account::<R>)
                .fallback(method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(app_state, require_token::<R>));

    Router::new()
        .route(
            "/account",
            get(list_accounts::<R>)
                .post(create_account::<R>)
                .fallback(method_not_allowed),
        )
        .route("/transfer", post(transfer).fallback(method_not_allowed))
        .merge(protected)
}

#[utoipa::path(
    get,
    path = "/account",
    responses(
        (status = 200, description = "All accounts in no particular order", body = [Account]),
        (status = 500, description = "Storage failure", body = ApiError),
    )
)]
async fn list_accounts<R>(
    State(app_state): State<AppState<R>>,
) -> Result<Json<Vec<Account>>, Error>
where
    R: AccountRepository,
{
    let accounts = app_state
        .account_repository
        .accounts()
        .await
        .map_err(Error::storage)?
        .try_collect::<Vec<_>>()
        .await
        .map_err(Error::storage)?;
    Ok(Json(accounts))
}

#[utoipa::path(
    post,
    path = "/account",
    request_body = CreateAccountRequest,
    responses(
        (
            status = 200,
            description = "The created account",
            body = Account,
            headers(("x-jwt-token" = String, description = "Token for the created account"))
        ),
        (status = 400, description = "Malformed request", body = ApiError),
        (status = 500, description = "Storage or token failure", body = ApiError),
    )
)]
#[instrument(skip(app_state))]
async fn create_account<R>(
    State(app_state): State<AppState<R>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, Error>
where
    R: AccountRepository,
{
    let CreateAccountRequest {
        first_name,
        last_name,
    } = request;

    let account = app_state
        .account_repository
        .create_account(NewAccount::new(first_name, last_name))
        .await
        .map_err(Error::storage)?;

    let token = app_state
        .token_service
        .issue(&account)
        .map_err(Error::Token)?;
    debug!(id = account.id, number = account.number, "issued token");

    info!(id = account.id, "created account");
    Ok(([(TOKEN_HEADER, token)], Json(account)))
}

#[utoipa::path(
    get,
    path = "/account/{id}",
    params(
        ("id" = i64, Path, description = "Account ID"),
        ("x-jwt-token" = String, Header, description = "Token for the account"),
    ),
    responses(
        (status = 200, description = "The account", body = Account),
        (status = 400, description = "Invalid ID", body = ApiError),
        (status = 403, description = "Permission denied", body = ApiError),
    )
)]
async fn get_account(Extension(account): Extension<Account>) -> Json<Account> {
    Json(account)
}

#[utoipa::path(
    delete,
    path = "/account/{id}",
    params(
        ("id" = i64, Path, description = "Account ID"),
        ("x-jwt-token" = String, Header, description = "Token for the account"),
    ),
    responses(
        (status = 200, description = "Account deleted", body = Deleted),
        (status = 400, description = "Invalid ID", body = ApiError),
        (status = 403, description = "Permission denied", body = ApiError),
        (status = 404, description = "Account not found", body = ApiError),
    )
)]
#[instrument(skip(app_state, account), fields(id = account.id))]
async fn delete_account<R>(
    State(app_state): State<AppState<R>>,
    Extension(account): Extension<Account>,
) -> Result<Json<Deleted>, Error>
where
    R: AccountRepository,
{
    let id = account.id;
    let deleted = app_state
        .account_repository
        .delete_account(id)
        .await
        .map_err(Error::storage)?;

    if !deleted {
        return Err(Error::NotFound(id));
    }

    info!(id, "deleted account");
    Ok(Json(Deleted { deleted: id }))
}

#[utoipa::path(
    post,
    path = "/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "The echoed transfer request", body = TransferRequest),
        (status = 400, description = "Malformed request", body = ApiError),
    )
)]
#[instrument]
async fn transfer(Json(request): Json<TransferRequest>) -> Json<TransferRequest> {
    debug!("transfer not applied");
    Json(request)
}
