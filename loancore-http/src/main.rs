use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use loancore_db_postgres::{CacheAdapter, PostgresUnitOfWork, RateLimiter};
use loancore_logic::{
    AuditServiceImpl, AuthorizationServiceImpl, CapitalServiceImpl, CollectionServiceImpl, LoanServiceImpl,
    ScheduleGeneratorImpl, UserServiceImpl,
};
use sqlx::postgres::PgPoolOptions;

use loancore_http::config::AppConfig;
use loancore_http::handlers;
use loancore_http::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().expect("failed to load configuration");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!(mode = %config.deployment_mode, "starting loancore-http");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.datastore_url)
        .await
        .expect("failed to connect to datastore");

    sqlx::migrate!("../loancore-db-postgres/migrations")
        .run(&pool)
        .await
        .expect("failed to run pending migrations");

    let uow = Arc::new(PostgresUnitOfWork::new(pool));
    let cache = Arc::new(CacheAdapter::new(config.cache_capacity, Duration::from_secs(config.cache_ttl_secs)));
    let login_rate_limiter = Arc::new(RateLimiter::new(
        config.login_rate_limit_attempts,
        Duration::from_secs(config.login_rate_limit_window_secs),
    ));

    let schedule_generator = Arc::new(ScheduleGeneratorImpl::new(uow.clone()));
    let schedule_batch_size = config.schedule_batch_size;
    let schedule_poll_interval = Duration::from_secs(config.schedule_poll_interval_secs);
    {
        let schedule_generator = schedule_generator.clone();
        tokio::spawn(async move {
            use loancore_api::ScheduleGenerator;
            loop {
                tokio::time::sleep(schedule_poll_interval).await;
                match schedule_generator.run_pending_batch(schedule_batch_size).await {
                    Ok(report) => {
                        if report.loans_processed > 0 {
                            tracing::info!(
                                loans_processed = report.loans_processed,
                                rows_inserted = report.rows_inserted,
                                loans_failed = report.loans_failed,
                                "schedule generation batch complete"
                            );
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "schedule generation batch failed"),
                }
            }
        });
    }

    let state = AppState {
        loan_service: Arc::new(LoanServiceImpl::new(uow.clone(), cache.clone())),
        collection_service: Arc::new(CollectionServiceImpl::new(uow.clone(), cache.clone())),
        user_service: Arc::new(UserServiceImpl::new(uow.clone())),
        capital_service: Arc::new(CapitalServiceImpl::new(uow.clone())),
        authorization_service: Arc::new(AuthorizationServiceImpl::new(uow.clone())),
        audit_service: Arc::new(AuditServiceImpl::new(uow.clone())),
        config: Arc::new(config.clone()),
        login_rate_limiter,
    };

    let bind_addr = config.bind_addr.clone();
    let bind_port = config.bind_port;

    tracing::info!(addr = %bind_addr, port = bind_port, "binding HTTP server");

    HttpServer::new(move || {
        let cors = if state.config.is_production() {
            state
                .config
                .cors_allowed_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
                .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
                .supports_credentials()
                .max_age(3600)
        } else {
            Cors::permissive()
        };

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-Content-Type-Options", "nosniff")),
            )
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new((*state.config).clone()))
            .configure(handlers::configure)
    })
    .bind((bind_addr.as_str(), bind_port))?
    .run()
    .await
}
