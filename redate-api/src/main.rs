use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod geo;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use redate_shared::clients::db::{self, DbPool};
use redate_shared::clients::rabbitmq::RabbitMQClient;
use redate_shared::clients::redis::RedisClient;
use redate_shared::middleware::{init_metrics, init_tracing, metrics_middleware};
use services::quota::CalendarPolicy;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
    pub calendar: CalendarPolicy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("redate-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = db::create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;
    let calendar = CalendarPolicy::with_utc_offset_minutes(config.quota_utc_offset_minutes);

    let metrics_handle = init_metrics();

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        calendar,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(move || {
            let handle = metrics_handle.clone();
            async move { handle.render() }
        }))
        .route("/swipes/:target_id/like", post(routes::swipes::like))
        .route("/swipes/:target_id/dislike", post(routes::swipes::dislike))
        .route("/swipes/:target_id/superlike", post(routes::swipes::superlike))
        .route("/swipes/undo", post(routes::swipes::undo))
        .route("/swipes/history", get(routes::swipes::history))
        .route("/users/profile", post(routes::profile::create_profile).put(routes::profile::update_profile))
        .route("/users/me", get(routes::profile::me))
        .route("/users/photo", post(routes::profile::add_photo))
        .route("/users/location", post(routes::profile::update_location))
        .route("/users/preferences", put(routes::profile::set_preferences))
        .route("/users/nearby", get(routes::feed::nearby))
        .route("/matches", get(routes::matches::list))
        .route("/matches/count", get(routes::matches::count))
        .route("/matches/:match_id", get(routes::matches::detail).delete(routes::matches::unmatch))
        .route("/matches/:match_id/report", post(routes::matches::report))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "redate-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
