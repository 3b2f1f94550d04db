pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use self::auth::require_bearer;
use self::handlers::{delete_rule, get_rule, list_rules, upsert_rule};
use crate::engine::RedirectEngine;
use crate::storage::RuleStore;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn RuleStore>,
    pub engine: Arc<RedirectEngine>,
    pub api_key: String,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    let mut router = Router::new()
        .route(
            "/api/rules",
            get(list_rules).put(upsert_rule).post(upsert_rule),
        )
        .route("/api/rules/{host}", get(get_rule).delete(delete_rule));

    // An empty key serves the admin API unauthenticated.
    if !state.api_key.is_empty() {
        router = router.layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));
    }

    router.with_state(state)
}
