//! Router assembly: route groups, the cross-cutting middleware stack,
//! static assets and the terminal 404/error fallbacks.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{Html, Response},
    routing::get,
    Router,
};
use time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::{
    config::AppConfig,
    error::AppError,
    extractors::RenderContext,
    identity::IdentityBackend,
    session::{self, ErrorBag},
    user::{self, UserRoutes},
    views,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub identity: Arc<dyn IdentityBackend>,
}

/// A group of routes that knows how to attach itself to the router.
pub trait RouteRegistrar {
    fn register(&self, router: Router<AppState>) -> Router<AppState>;
}

/// The view-only pages: no guards, no side effects.
pub struct BaseRoutes;

impl RouteRegistrar for BaseRoutes {
    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        router
            .route("/", get(index))
            .route("/register", get(register_page))
            .route("/channel", get(channel))
            .route("/home", get(home))
    }
}

async fn index(ctx: RenderContext) -> Html<String> {
    views::index(&ctx)
}

async fn register_page(ctx: RenderContext) -> Html<String> {
    views::register(&ctx)
}

async fn channel(ctx: RenderContext) -> Html<String> {
    views::channel(&ctx)
}

async fn home(ctx: RenderContext) -> Html<String> {
    views::home(&ctx)
}

/// Copies flash errors accumulated in the session into this request's
/// render context, then resets the session bag. Errors a handler writes
/// to the session after this point surface on the *next* request,
/// unless the handler writes the render context directly.
async fn error_context(session: Session, mut request: Request, next: Next) -> Response {
    let mut ctx = RenderContext::default();
    match session::errors(&session).await {
        Ok(Some(errors)) => ctx.errors = errors,
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "failed to read session errors"),
    }
    if let Err(e) = session::set_errors(&session, &ErrorBag::default()).await {
        tracing::warn!(error = %e, "failed to reset session errors");
    }

    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Catch-all for unmatched paths; the error view renders it as a 404.
async fn not_found() -> AppError {
    AppError::NotFound
}

pub fn create_router(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.config.session.inactivity_minutes,
        )));

    let registrars: [&dyn RouteRegistrar; 2] = [&BaseRoutes, &UserRoutes];
    let mut router = Router::new();
    for registrar in registrars {
        router = registrar.register(router);
    }

    router
        .fallback(not_found)
        .nest_service("/static", ServeDir::new("backend/static"))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user::auth_context,
        ))
        .layer(middleware::from_fn(error_context))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr =
        format!("{}:{}", state.config.web.addr, state.config.web.port).parse()?;
    let app = create_router(state);

    tracing::info!("Serving Huddle at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
