use actix_web::{web, App, HttpServer};
use article_service::db::{PgAccountStore, PgArticleStore};
use article_service::handlers::{self, health::HealthState};
use article_service::security::{PasswordHasher, TokenIssuer};
use article_service::services::{AccountService, ArticleService};
use article_service::{metrics, Config};
use entity_cache::{CacheStore, RedisStore};
use redis_utils::RedisPool;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    tracing::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting article-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        env = %config.app.env,
        list_write_discipline = %config.cache.list_write_discipline,
        "Configuration loaded"
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    let redis_pool = RedisPool::connect(&config.cache.url)
        .await
        .map_err(|e| startup_error("Failed to initialize Redis", e))?;
    let redis_store = RedisStore::new(redis_pool.manager());
    let cache: Arc<dyn CacheStore> = Arc::new(redis_store.clone());

    metrics::register().map_err(|e| startup_error("Failed to register metrics", e))?;

    let hasher = match config.auth.argon2_cost {
        Some((m_cost, t_cost, p_cost)) => PasswordHasher::with_cost(m_cost, t_cost, p_cost)
            .map_err(|e| startup_error("Invalid Argon2 parameters", e))?,
        None => PasswordHasher::default(),
    };
    let tokens = Arc::new(TokenIssuer::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_secs,
    ));

    let article_service = web::Data::new(ArticleService::new(
        Arc::new(PgArticleStore::new(db_pool.clone())),
        cache.clone(),
        config.cache.list_write_discipline,
    ));
    let account_service = web::Data::new(AccountService::new(
        Arc::new(PgAccountStore::new(db_pool.clone())),
        cache,
        hasher,
        tokens.clone(),
    ));
    let token_data = web::Data::new(tokens);
    let health_state = web::Data::new(HealthState::new(db_pool, redis_store));

    let bind_addr = config.bind_addr();
    tracing::info!("HTTP server listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(article_service.clone())
            .app_data(account_service.clone())
            .app_data(token_data.clone())
            .app_data(health_state.clone())
            .configure(handlers::health::configure)
            .configure(handlers::configure)
            .route("/metrics", web::get().to(metrics::serve_metrics))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
