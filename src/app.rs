use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::AppConfig;
use crate::database::TowerStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::TowerService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub towers: TowerService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn TowerStore>, config: AppConfig) -> Self {
        Self {
            towers: TowerService::new(store, config.activity.capacity),
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/auth/login", post(public::login))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, dashboard, tenants, towers};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        // Collection-level operations
        .route("/api/towers", get(towers::list).post(towers::create))
        .route("/api/towers/search", get(towers::search))
        .route("/api/towers/export", post(towers::export))
        .route("/api/towers/bulk", delete(towers::bulk_delete))
        // Tower-level operations
        .route(
            "/api/towers/:id",
            get(towers::show).put(towers::update).delete(towers::delete),
        )
        .route("/api/towers/:id/tenants", get(tenants::list).post(tenants::create))
        .route(
            "/api/towers/:id/tenants/:tenant_id",
            put(tenants::update).delete(tenants::delete),
        )
        .route("/api/dashboard/metrics", get(dashboard::metrics))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
