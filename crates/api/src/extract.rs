//! Extractors that reject with [`AppError`] instead of axum's plain-text
//! rejections, so malformed input still gets the JSON envelope.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use crm_core::ids::{parse_id, CONTACT_ENTITY, DEAL_ENTITY};
use crm_core::types::DbId;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `Json<T>` whose rejection is a 400 envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    AppError::BadRequest(rejection.body_text())
}

/// `Query<T>` whose rejection is a 400 envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    tracing::debug!(error = %rejection.body_text(), "Rejected query string");
    AppError::BadRequest(rejection.body_text())
}

/// The `{id}` path segment of a contact route, parsed into a [`DbId`].
/// Malformed ids reject with `Invalid contact ID`.
#[derive(Debug, Clone, Copy)]
pub struct ContactId(pub DbId);

/// The `{id}` path segment of a deal route, parsed into a [`DbId`].
/// Malformed ids reject with `Invalid deal ID`.
#[derive(Debug, Clone, Copy)]
pub struct DealId(pub DbId);

async fn raw_path_id<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<String, AppError> {
    Path::<String>::from_request_parts(parts, state)
        .await
        .map(|Path(raw)| raw)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

impl<S: Send + Sync> FromRequestParts<S> for ContactId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = raw_path_id(parts, state).await?;
        Ok(ContactId(parse_id(CONTACT_ENTITY, &raw)?))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for DealId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = raw_path_id(parts, state).await?;
        Ok(DealId(parse_id(DEAL_ENTITY, &raw)?))
    }
}
