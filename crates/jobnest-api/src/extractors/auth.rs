//! `CurrentUser` extractor: the principal attached by the authentication gate.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use jobnest_auth::error::AuthError;
use jobnest_service::context::Principal;

use crate::error::ApiError;

/// The authenticated principal. Rejects with 401 when the gate attached none.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl std::ops::Deref for CurrentUser {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AuthError::Unauthorized("Authentication required".into()).into())
    }
}
