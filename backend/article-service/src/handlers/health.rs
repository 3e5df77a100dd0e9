/// Liveness and readiness endpoints
use actix_web::{web, HttpResponse};
use chrono::Utc;
use entity_cache::RedisStore;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;

pub struct HealthState {
    db_pool: PgPool,
    redis: RedisStore,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    pub fn new(db_pool: PgPool, redis: RedisStore) -> Self {
        Self { db_pool, redis }
    }

    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

fn component(result: Result<(), String>, ok: &str, started: Instant) -> ComponentCheck {
    let latency_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: ok.to_string(),
            latency_ms,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: e,
            latency_ms,
        },
    }
}

pub async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "article-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "article-service"
        })),
    }
}

pub async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let started = Instant::now();
    let pg = state
        .check_postgres()
        .await
        .map_err(|e| format!("PostgreSQL connection failed: {}", e));
    checks.insert(
        "postgresql".to_string(),
        component(pg, "PostgreSQL connection successful", started),
    );

    let started = Instant::now();
    let redis = state
        .redis
        .ping()
        .await
        .map_err(|e| format!("Redis ping failed: {}", e));
    checks.insert(
        "redis".to_string(),
        component(redis, "Redis ping successful", started),
    );

    let ready = checks
        .values()
        .all(|c| matches!(c.status, ComponentStatus::Healthy));
    let response = ReadinessResponse {
        ready,
        status: if ready {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/health", web::get().to(health_summary))
        .route("/api/v1/health/ready", web::get().to(readiness_summary))
        .route("/api/v1/health/live", web::get().to(liveness_check));
}
