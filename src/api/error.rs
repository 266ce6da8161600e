use crate::token;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use error_ext::{BoxError, StdErrorExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub error: String,
}

/// Errors of all handlers and middleware, turned into [ApiError] responses.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid id given {0}")]
    InvalidId(String),

    #[error("{}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    InvalidPath(#[from] PathRejection),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(Method),

    #[error("permission denied")]
    PermissionDenied,

    #[error("account with id {0} not found")]
    NotFound(i64),

    #[error("storage error")]
    Storage(#[source] BoxError),

    #[error("cannot issue token")]
    Token(#[source] token::Error),
}

impl Error {
    pub fn storage<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Storage(Box::new(error))
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidId(_) | Error::InvalidJson(_) | Error::InvalidPath(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = self.as_chain(), "cannot handle request");
        }

        let body = ApiError {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON extractor and response, rejecting malformed bodies with an [ApiError].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path extractor, rejecting undecodable segments with an [ApiError].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

pub async fn method_not_allowed(method: Method) -> Error {
    Error::MethodNotAllowed(method)
}

pub fn parse_id(id: &str) -> Result<i64, Error> {
    id.parse().map_err(|_| Error::InvalidId(id.to_string()))
}
