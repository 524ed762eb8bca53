//! The user-account component: login, registration, logout and account
//! maintenance, all delegated to the identity backend. Also carries the
//! auth-context middleware that mirrors the resolved account into the
//! session and the render context.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tower_sessions::Session;
use validator::Validate;

use common::{
    utils::validation_messages, LoginForm, PasswordForm, ProfileForm, RegisterForm,
};

use crate::{
    error::AppError,
    extractors::RenderContext,
    session::{self, ErrorSlot},
    views,
    web_server::{AppState, RouteRegistrar},
};

/// Account-lifecycle routes. `GET /account` lives here rather than with
/// the plain view renders because it carries the authentication guard.
pub struct UserRoutes;

impl RouteRegistrar for UserRoutes {
    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        router
            .route("/login", post(login))
            .route("/register", post(register))
            .route("/sign-up", get(get_sign_up))
            .route("/logout", get(logout))
            .route("/account", get(get_account).post(update_account))
            .route("/password", post(update_password))
    }
}

/// Resolves the current account for sessions that carry a backend
/// token, mirroring it into the session cache and the render context.
/// Suspends at the backend call; a lookup failure downgrades the
/// request to anonymous instead of failing it.
pub async fn auth_context(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match session::token(&session).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session token");
            None
        }
    };

    if let Some(token) = token {
        match state.identity.current_user(&token).await {
            Ok(Some(user)) => {
                if let Err(e) = session::cache_user(&session, &user).await {
                    tracing::warn!(error = %e, "failed to cache user in session");
                }
                if let Some(ctx) = request.extensions_mut().get_mut::<RenderContext>() {
                    ctx.user = Some(user);
                    ctx.logged_in = true;
                }
            }
            Ok(None) => {
                tracing::debug!("session token no longer maps to an account");
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity lookup failed; continuing anonymously");
            }
        }
    }

    next.run(request).await
}

/// `POST /login`. Success stores the backend token and redirects to
/// `/home`; any failure lands its message in the `login` flash slot and
/// redirects back to `/`.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    if let Err(errors) = form.validate() {
        session::flash(&session, ErrorSlot::Login, validation_messages(&errors)).await?;
        return Ok(Redirect::to("/"));
    }

    tracing::info!(email = %form.email, "login attempt");
    match state.identity.login(&form.email, &form.password).await {
        Ok(auth) => {
            session::authenticate(&session, auth.token, auth.user).await?;
            Ok(Redirect::to("/home"))
        }
        Err(e) => {
            session::flash(&session, ErrorSlot::Login, vec![e.to_string()]).await?;
            Ok(Redirect::to("/"))
        }
    }
}

/// `POST /register`. Confirmation matching is checked before the
/// backend sees the request; failures flash into the `register` slot
/// and return to `/sign-up`.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    if let Err(errors) = form.validate() {
        session::flash(&session, ErrorSlot::Register, validation_messages(&errors)).await?;
        return Ok(Redirect::to("/sign-up"));
    }

    tracing::info!(email = %form.email, "registration attempt");
    match state.identity.register(&form.email, &form.password).await {
        Ok(auth) => {
            session::authenticate(&session, auth.token, auth.user).await?;
            Ok(Redirect::to("/home"))
        }
        Err(e) => {
            session::flash(&session, ErrorSlot::Register, vec![e.to_string()]).await?;
            Ok(Redirect::to("/sign-up"))
        }
    }
}

/// `GET /sign-up`: a plain render, no side effects.
pub async fn get_sign_up(ctx: RenderContext) -> Html<String> {
    views::sign_up(&ctx)
}

/// `GET /account`: unauthenticated visitors are bounced to the landing
/// page, everyone else gets the account view.
pub async fn get_account(session: Session, ctx: RenderContext) -> Result<Response, AppError> {
    if session::token(&session).await?.is_none() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(views::account(&ctx).into_response())
}

/// `POST /account`: updates the profile through the backend. Outcome
/// messages go straight into this response's render context, so they
/// show on the immediate render rather than after a redirect.
pub async fn update_account(
    State(state): State<AppState>,
    session: Session,
    mut ctx: RenderContext,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    if ctx.user.is_none() {
        return logout_inner(&state, &session).await;
    }
    let Some(token) = session::token(&session).await? else {
        return logout_inner(&state, &session).await;
    };

    if let Err(errors) = form.validate() {
        ctx.errors.profile = validation_messages(&errors);
        return Ok(views::account(&ctx).into_response());
    }

    match state
        .identity
        .update_profile(&token, &form.display_name, &form.email)
        .await
    {
        Ok(user) => {
            session::cache_user(&session, &user).await?;
            ctx.user = Some(user);
            ctx.errors.profile = vec!["Your details have been updated".to_string()];
        }
        Err(e) => {
            ctx.errors.profile = vec![e.to_string()];
        }
    }
    Ok(views::account(&ctx).into_response())
}

/// `POST /password`: same shape as the profile update, on the
/// `password` flash slot.
pub async fn update_password(
    State(state): State<AppState>,
    session: Session,
    mut ctx: RenderContext,
    Form(form): Form<PasswordForm>,
) -> Result<Response, AppError> {
    if ctx.user.is_none() {
        return logout_inner(&state, &session).await;
    }
    let Some(token) = session::token(&session).await? else {
        return logout_inner(&state, &session).await;
    };

    if let Err(errors) = form.validate() {
        ctx.errors.password = validation_messages(&errors);
        return Ok(views::account(&ctx).into_response());
    }

    match state.identity.update_password(&token, &form.password).await {
        Ok(()) => {
            ctx.errors.password = vec!["Your password has been updated".to_string()];
        }
        Err(e) => {
            ctx.errors.password = vec![e.to_string()];
        }
    }
    Ok(views::account(&ctx).into_response())
}

/// `GET /logout`: destroys the session and signs out of the backend;
/// the visitor lands on `/` whether or not the backend call succeeds.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    logout_inner(&state, &session).await
}

async fn logout_inner(state: &AppState, session: &Session) -> Result<Response, AppError> {
    let token = session::token(session).await?;

    // The farewell flash is written before the destroy and dies with
    // the session record.
    session::flash(
        session,
        ErrorSlot::General,
        vec!["You have been logged out".to_string()],
    )
    .await?;
    session::destroy(session).await?;

    if let Some(token) = token {
        if let Err(e) = state.identity.sign_out(&token).await {
            tracing::warn!(error = %e, "backend sign-out failed");
        }
    }

    Ok(Redirect::to("/").into_response())
}
