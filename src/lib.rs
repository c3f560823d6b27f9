mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod realtime;
mod routes;
mod service;
mod util;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::database::postgres_repository::PostgresRepository;
use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::realtime::SessionChannels;
use crate::routes as app_routes;
use crate::service::sprint::SprintService;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG overrides the configured level for per-module control, e.g.
    // RUST_LOG=info,ripl_api::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // try_init so tests that build several instances don't panic
    if json_format {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

fn ensure_rocket_secret_key() {
    let profile = std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "debug".to_string());

    // Session cookies are encrypted with this key; a random per-boot key
    // would log everyone out on restart.
    if profile != "debug" && std::env::var("ROCKET_SECRET_KEY").is_err() {
        panic!(
            "ROCKET_SECRET_KEY is required for profile '{}'. Generate one with: openssl rand -base64 32",
            profile
        );
    }
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Either set specific origins or disable credentials."
        );
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

/// Background loop that completes overdue sprints and, once an hour, purges
/// expired magic-link tokens and stale read notifications.
fn stage_sweeper(sprint_config: config::SprintConfig) -> AdHoc {
    AdHoc::on_liftoff("Sprint sweeper", move |rocket| {
        Box::pin(async move {
            let Some(pool) = rocket.state::<PgPool>().cloned() else {
                tracing::warn!("Sprint sweeper not started: no database pool");
                return;
            };
            let Some(channels) = rocket.state::<Arc<SessionChannels>>().cloned() else {
                tracing::warn!("Sprint sweeper not started: no realtime registry");
                return;
            };

            let sweep_interval_seconds = sprint_config.sweep_interval_seconds;
            let retention_days = sprint_config.notification_retention_days;

            tokio::spawn(async move {
                let repo = PostgresRepository { pool };
                let mut sweep = tokio::time::interval(Duration::from_secs(sweep_interval_seconds));
                sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                let mut housekeeping = tokio::time::interval(Duration::from_secs(3600));

                loop {
                    tokio::select! {
                        _ = sweep.tick() => {
                            let service = SprintService::new(&repo, &channels);
                            if let Err(err) = service.sweep_overdue().await {
                                tracing::warn!(error = ?err, "sprint sweep failed");
                            }
                        }
                        _ = housekeeping.tick() => {
                            if let Err(err) = repo.cleanup_expired_magic_link_tokens().await {
                                tracing::warn!(error = ?err, "magic link cleanup failed");
                            }
                            if let Err(err) = repo.cleanup_old_notifications(retention_days).await {
                                tracing::warn!(error = ?err, "notification cleanup failed");
                            }
                        }
                    }
                }
            });

            tracing::info!(interval_seconds = sweep_interval_seconds, "sprint sweeper started");
        })
    })
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_rocket_secret_key();

    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    rocket::custom(figment)
        .manage(Arc::new(SessionChannels::new()))
        .manage(config.clone())
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database))
        .attach(stage_sweeper(config.sprint))
        .mount("/api/users", app_routes::user::routes())
        .mount("/api/profiles", app_routes::profile::routes())
        .mount("/api/venues", app_routes::venue::routes())
        .mount(
            "/api/sessions",
            [
                app_routes::cowork_session::routes(),
                app_routes::sprint::routes(),
                app_routes::events::routes(),
            ]
            .concat(),
        )
        .mount("/api/notifications", app_routes::notification::routes())
        .mount("/api/health", app_routes::health::routes())
        .register(
            "/api",
            catchers![
                app_routes::error::unauthorized,
                app_routes::error::not_found,
                app_routes::error::conflict,
                app_routes::error::unprocessable
            ],
        )
}
