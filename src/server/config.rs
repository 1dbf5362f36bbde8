use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::server::handlers::{
    check_company, close_ticket, create_user, export_report, generate_report, get_company,
    get_ticket, get_user, health_check, list_tickets, register_company, submit_ticket,
    tickets_by_user, update_company, update_ticket,
};
use crate::server::services::{
    MemoryStore, NotificationObserver, PostgresStore, Store, TicketFacade,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub facade: Arc<TicketFacade>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let mut facade = TicketFacade::new(store.clone());
        facade.attach(Arc::new(NotificationObserver));
        Self {
            store,
            facade: Arc::new(facade),
        }
    }
}

/// Production wiring: Postgres-backed store.
pub fn configure_app(pool: PgPool) -> Router {
    app_router(AppState::new(Arc::new(PostgresStore::new(pool))))
}

/// In-process wiring used by the test suite and local experiments.
pub fn configure_memory_app() -> Router {
    app_router(AppState::new(Arc::new(MemoryStore::new())))
}

async fn log_request(request: Request, next: Next) -> Response {
    info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tickets", post(submit_ticket).get(list_tickets))
        .route("/tickets/report/generate", post(generate_report))
        .route("/tickets/report/export", post(export_report))
        .route("/tickets/user/:user_id", get(tickets_by_user))
        .route("/tickets/:id", get(get_ticket).put(update_ticket))
        .route("/tickets/:id/close", patch(close_ticket))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/company/check", post(check_company))
        .route("/company/register", post(register_company))
        .route("/company/:id", get(get_company).put(update_company))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
