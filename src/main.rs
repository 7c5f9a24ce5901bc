mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{
    http::header,
    middleware::{Compress, Logger, NormalizePath},
    web, App, HttpResponse, HttpServer,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::db::Database;
use crate::routes::create_routes;
use crate::services::{AuthService, EmailNotifier, ObjectStorage, RewriteService};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub storage: ObjectStorage,
    pub rewrite: RewriteService,
    pub notifier: EmailNotifier,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Sophie Carter Fitness site backend");

    let config = Config::from_env()?;
    info!("Configuration loaded from environment");

    let db = Database::new(&config.database_url).await?;
    info!("Database connected");

    db.run_migrations().await?;
    info!("Database migrations completed");

    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            AuthService::new(&db)
                .bootstrap_admin(&config.admin_name, email, password)
                .await?;
        }
        _ => info!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    let storage = ObjectStorage::from_config(&config);
    storage.ensure_bucket().await?;

    let rewrite = RewriteService::from_config(&config)?;
    if !rewrite.is_configured() {
        warn!("OPENAI_API_KEY is not set, AI rewrites are disabled");
    }

    let notifier = EmailNotifier::from_config(&config);
    if !notifier.is_enabled() {
        info!("EmailJS is not configured, inquiry notifications are disabled");
    }

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let cors_allow_origin = config.cors_allow_origin.clone();
    let storage_dir = storage.root().to_path_buf();

    let state = web::Data::new(AppState {
        db,
        config: Arc::new(config),
        storage,
        rewrite,
        notifier,
    });

    info!("Server running at http://{}", addr);

    HttpServer::new(move || {
        let cors = build_cors(&cors_allow_origin);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .route("/health", web::get().to(health_check))
            .route("/health/db", web::get().to(health_check_db))
            .service(web::scope("/api/v1").configure(create_routes))
            .service(
                web::resource("/api/ai")
                    .wrap(middleware::AdminMiddleware)
                    .route(web::post().to(routes::ai::rewrite_content)),
            )
            .service(Files::new("/storage", storage_dir.clone()))
    })
    .keep_alive(actix_web::http::KeepAlive::Timeout(
        std::time::Duration::from_secs(75),
    ))
    .client_request_timeout(std::time::Duration::from_secs(300))
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}

fn build_cors(cors_allow_origin: &str) -> Cors {
    // credentials rule out allow_any_origin(), so "*" echoes the caller's origin
    if cors_allow_origin == "*" {
        Cors::default()
            .allowed_origin_fn(|_origin, _req_head| true)
            .allow_any_method()
            .allow_any_header()
            .expose_headers(vec![header::SET_COOKIE])
            .supports_credentials()
            .max_age(3600)
    } else {
        let mut cors = Cors::default();
        for origin in cors_allow_origin.split(',').map(|s| s.trim()) {
            cors = cors.allowed_origin(origin);
        }
        cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                header::COOKIE,
            ])
            .expose_headers(vec![header::SET_COOKIE])
            .supports_credentials()
            .max_age(3600)
    }
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": true }))
}

async fn health_check_db(
    state: web::Data<AppState>,
) -> Result<HttpResponse, crate::error::AppError> {
    sqlx::query("SELECT 1").execute(state.db.pool()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": true })))
}
