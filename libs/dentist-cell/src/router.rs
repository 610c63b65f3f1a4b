use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn dentist_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_dentists))
        .route("/{dentist_id}", get(handlers::get_dentist))
        .route("/{dentist_id}/availability", get(handlers::get_availability))
        .route("/{dentist_id}/blocked-dates", post(handlers::create_blocked_date))
        .route("/{dentist_id}/blocked-dates", get(handlers::list_blocked_dates))
        .route(
            "/{dentist_id}/blocked-dates/{blocked_date_id}",
            delete(handlers::delete_blocked_date),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
