use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use domain::services::{
    seed, ActivityLog, AnnouncementBoard, AnnouncementDelivery, DirectoryStore, MockDelivery,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{announcements, clients, groups, health, logs, overview, selection};

/// Shared state handed to every handler.
///
/// Locks are always taken in the order directory, announcements, activity.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<RwLock<DirectoryStore>>,
    pub announcements: Arc<RwLock<AnnouncementBoard>>,
    pub activity: Arc<RwLock<ActivityLog>>,
    pub delivery: Arc<dyn AnnouncementDelivery>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds state from configuration, seeding demo data when enabled.
    pub fn new(config: Config) -> Self {
        Self::with_delivery(config, Arc::new(MockDelivery::new()))
    }

    pub fn with_delivery(config: Config, delivery: Arc<dyn AnnouncementDelivery>) -> Self {
        let now = Utc::now();
        let (directory, board) = if config.directory.seed_demo_data {
            info!("Seeding demo fleet and announcements");
            (
                seed::demo_directory(now, config.directory.event_buffer),
                seed::demo_board(now),
            )
        } else {
            (
                DirectoryStore::with_event_buffer(config.directory.event_buffer),
                AnnouncementBoard::new(),
            )
        };

        Self {
            directory: Arc::new(RwLock::new(directory)),
            announcements: Arc::new(RwLock::new(board)),
            activity: Arc::new(RwLock::new(ActivityLog::with_capacity(
                config.activity.capacity,
            ))),
            delivery,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let client_routes = Router::new()
        .route(
            "/api/v1/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route("/api/v1/clients/grouped", get(clients::grouped_clients))
        .route("/api/v1/clients/select-all", post(clients::select_all_clients))
        .route(
            "/api/v1/clients/bulk-delete",
            post(clients::bulk_delete_clients),
        )
        .route(
            "/api/v1/clients/:client_id",
            get(clients::get_client)
                .patch(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/api/v1/clients/:client_id/selection",
            put(clients::set_client_selection),
        );

    let group_routes = Router::new()
        .route(
            "/api/v1/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/api/v1/groups/:group_id",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route(
            "/api/v1/groups/:group_id/clients",
            get(groups::list_group_clients),
        )
        .route(
            "/api/v1/groups/:group_id/clients/:client_id",
            put(groups::add_client_to_group).delete(groups::remove_client_from_group),
        )
        .route(
            "/api/v1/groups/:group_id/selection",
            put(groups::set_group_selection),
        )
        .route(
            "/api/v1/groups/:group_id/select-clients",
            post(groups::select_group_clients),
        );

    let selection_routes = Router::new().route(
        "/api/v1/selection",
        get(selection::get_selection).delete(selection::clear_selection),
    );

    let announcement_routes = Router::new()
        .route(
            "/api/v1/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/api/v1/announcements/bulk-delete",
            post(announcements::bulk_delete_announcements),
        )
        .route(
            "/api/v1/announcements/send",
            post(announcements::bulk_send_announcements),
        )
        .route(
            "/api/v1/announcements/broadcast",
            post(announcements::broadcast_announcement),
        )
        .route(
            "/api/v1/announcements/:announcement_id",
            get(announcements::get_announcement)
                .patch(announcements::update_announcement)
                .delete(announcements::delete_announcement),
        )
        .route(
            "/api/v1/announcements/:announcement_id/send",
            post(announcements::send_announcement),
        );

    let dashboard_routes = Router::new()
        .route("/api/v1/logs", get(logs::list_logs))
        .route("/api/v1/overview", get(overview::get_overview));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(client_routes)
        .merge(group_routes)
        .merge(selection_routes)
        .merge(announcement_routes)
        .merge(dashboard_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
