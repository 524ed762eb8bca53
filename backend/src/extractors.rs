use axum::{extract::FromRequestParts, http::request::Parts};

use common::UserProfile;

use crate::{error::AppError, session::ErrorBag};

/// Request-scoped state handed to the view layer: the flash errors
/// copied out of the session at the start of the request, plus the
/// resolved account if the visitor is logged in. Populated by the
/// error-context and auth-context middleware; discarded with the
/// response.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    pub errors: ErrorBag,
    pub user: Option<UserProfile>,
    pub logged_in: bool,
}

impl<S> FromRequestParts<S> for RenderContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The middleware is responsible for putting the context in
        // extensions. If it's not there the stack is misassembled.
        let ctx = parts.extensions.get::<RenderContext>().ok_or_else(|| {
            AppError::Internal(
                "RenderContext not found in request extensions. Is the context middleware missing?"
                    .into(),
            )
        })?;

        Ok(ctx.clone())
    }
}
