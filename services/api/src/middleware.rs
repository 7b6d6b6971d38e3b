//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use booking::BookingError;
use common::token::TokenType;
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// Resolve the bearer token into a [`booking::Session`] request extension
///
/// The role comes from the stored account, not from the token, so a role
/// change applies to the very next request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state
        .verifier
        .validate_as(bearer.token(), TokenType::Access)
        .map_err(|e| {
            debug!("Rejected access token: {}", e);
            ApiError::Unauthorized
        })?;

    let session = match state.accounts.session_for(claims.sub).await {
        Ok(session) => session,
        Err(BookingError::NotFound(_)) => {
            warn!("Token for unknown account: {}", claims.sub);
            return Err(ApiError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
