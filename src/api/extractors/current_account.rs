//! Bearer token authentication extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::AppState;
use crate::domain::AccountId;
use crate::errors::AppError;

/// Account identified by the request's bearer token.
///
/// Rejects with [`AppError::Unauthorized`] when the header is missing, is
/// not a bearer token, or the token does not verify. Take it as
/// `Result<CurrentAccount, AppError>` to decide when the failure surfaces.
#[derive(Clone, Copy, Debug)]
pub struct CurrentAccount(pub AccountId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let id = state.authenticator.extract_id(header)?;
        Ok(CurrentAccount(id))
    }
}
