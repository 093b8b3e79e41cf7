//! Raw JSON body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::RestError;

/// Axum extractor for a JSON request body.
///
/// The body is only parsed, not validated, so that the handler can report
/// every schema issue at once. Unparsable bodies reject with
/// `400 VALIDATION_ERROR`. The `Content-Type` header is not checked.
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(RestError::malformed_json)?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(RestError::malformed_json)
    }
}
