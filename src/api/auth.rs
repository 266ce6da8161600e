use crate::{
    api::{
        error::{parse_id, Error, Path},
        AppState,
    },
    domain::AccountRepository,
    token::{self, Claims, TokenService},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

/// Request header carrying the token.
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// Only let requests through which carry a valid token bound to the number of the account given
/// by the `id` path parameter. The resolved [Account](crate::domain::Account) is handed on to the
/// handler as request extension.
///
/// The id is checked first, hence an invalid id is rejected as bad request even without a token.
pub async fn require_token<R>(
    State(app_state): State<AppState<R>>,
    Path(id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error>
where
    R: AccountRepository,
{
    let id = parse_id(&id)?;

    let claims = claims(&request, &app_state.token_service).map_err(|reason| {
        debug!(id, reason, "token rejected");
        Error::PermissionDenied
    })?;

    let account = app_state
        .account_repository
        .account_by_id(id)
        .await
        .map_err(Error::storage)?
        .ok_or_else(|| {
            debug!(id, "account for token not found");
            Error::PermissionDenied
        })?;

    // Numbers are not unique, so this binds the token to any account sharing the number.
    if account.number != claims.account_number {
        warn!(
            id,
            account_number = claims.account_number,
            "token bound to another account number"
        );
        return Err(Error::PermissionDenied);
    }

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

fn claims(request: &Request, token_service: &TokenService) -> Result<Claims, &'static str> {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or("missing token")?;

    token_service.validate(token).map_err(|error| match error {
        token::Error::Expired => "token expired",
        _ => "invalid token",
    })
}
