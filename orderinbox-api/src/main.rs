use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

mod analysis;
mod config;
mod database;
mod handlers;
mod integrations;
mod jobs;

use analysis::AnalysisService;
use integrations::{AlertDispatcher, LogDispatcher, WebhookDispatcher};
use jobs::BudgetMonitor;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "orderinbox-api"
    }))
}

#[get("/health")]
async fn health(db: web::Data<Arc<database::Database>>) -> impl Responder {
    // Test database connection
    match db.connection.lock() {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::InternalServerError().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = args.log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("orderinbox-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Initialize database
    let db_path = database::get_db_path().expect("Failed to determine database path");
    let db = Arc::new(database::Database::new(&db_path).expect("Failed to initialize database"));
    tracing::info!("Database initialized at: {:?}", db_path);

    // Load config
    let (config, config_path) = config::ApiConfig::load().expect("Failed to load config");
    tracing::info!("Config loaded from: {:?}", config_path);

    // Get server config or use defaults
    let (host, port) = if let Some(server_config) = &config.server {
        (server_config.host.clone(), server_config.port)
    } else {
        ("127.0.0.1".to_string(), 8080)
    };

    tracing::info!("Server will listen on {}:{}", host, port);

    let imap_config = config.imap.clone().unwrap_or_default();
    let service = Arc::new(AnalysisService::new(imap_config));

    let dispatcher: Arc<dyn AlertDispatcher> = match &config.alerts {
        Some(alerts) => Arc::new(WebhookDispatcher::new(alerts.webhook_url.clone())),
        None => Arc::new(LogDispatcher),
    };

    let monitor = Arc::new(BudgetMonitor::new(
        db.async_connection.clone(),
        service.clone(),
        dispatcher.clone(),
    ));

    // Spawn periodic budget refresh task
    let interval_secs = config
        .monitor
        .as_ref()
        .map(|m| m.interval_secs)
        .unwrap_or(300);
    let monitor_clone = monitor.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            if monitor_clone.is_shutting_down() {
                break;
            }
            monitor_clone.refresh_all().await;
        }
    });

    tracing::info!("Starting server on {}:{}", host, port);

    let monitor_shutdown = monitor.clone();
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if let Some(cors_config) = &config.cors {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(monitor.clone()))
            .app_data(web::Data::new(dispatcher.clone()))
            .service(hello)
            .service(health)
            .route("/api/login", web::post().to(handlers::auth::login))
            .route("/api/analyze", web::post().to(handlers::analysis::analyze))
            .route("/api/set_budget", web::post().to(handlers::budget::set_budget))
            .route(
                "/api/get_monthly_expenses",
                web::post().to(handlers::budget::get_monthly_expenses),
            )
            .route(
                "/api/send_budget_alert",
                web::post().to(handlers::budget::send_budget_alert),
            )
    })
    .bind((host.as_str(), port))?;

    let result = server.run().await;

    // Stop the refresh loop so an in-flight pass ends at the next user.
    monitor_shutdown.shutdown();

    result
}
