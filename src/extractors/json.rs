//! JSON body extractor that reports malformed bodies in the service's error shape.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

/// Like `axum::Json`, but missing fields, wrong types, bad syntax and a missing
/// `Content-Type: application/json` all become a 422 `validation_error`.
#[derive(Clone, Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => match rejection {
                JsonRejection::JsonDataError(_)
                | JsonRejection::JsonSyntaxError(_)
                | JsonRejection::MissingJsonContentType(_) => {
                    tracing::debug!(reason = %rejection.body_text(), "request body rejected");
                    Err(AppError::Validation(rejection.body_text()).into_response())
                }
                // body read failures (e.g. over the size limit) keep axum's status
                other => Err(other.into_response()),
            },
        }
    }
}
