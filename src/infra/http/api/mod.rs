pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, put},
};

pub fn build_api_router(state: ApiState) -> Router {
    let admin_state = state.clone();

    let admin = Router::new()
        .route("/api/v1/admin/site/{site}", put(handlers::put_site))
        .route(
            "/api/v1/admin/site/{site}/default/{key}",
            put(handlers::put_default).delete(handlers::delete_default),
        )
        .layer(axum_middleware::from_fn_with_state(
            admin_state,
            middleware::admin_auth,
        ));

    Router::new()
        .route(
            "/api/v1/preference/{site}",
            get(handlers::get_preferences).post(handlers::update_preference),
        )
        .merge(admin)
        .with_state(state)
}
