/// HTTP process boundary: a health surface plus the synchronous
/// "check now" entry point into the monitoring pipeline.
use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::monitoring::CycleRunner;

pub struct AppState {
    pub runner: Arc<CycleRunner>,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(health).service(check_now);
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "online",
        "service": "vigil monitoring service",
    }))
}

/// Liveness probe for the process itself.
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "healthy" }))
}

#[derive(Debug, Deserialize)]
struct CheckNowQuery {
    /// Restrict the cycle to one owner's services.
    owner: Option<String>,
}

/// Force an immediate monitoring cycle and report per-service results.
/// Transition notifications still fire; a probe failure is reported as a
/// down status, not as an error.
#[post("/check-now")]
async fn check_now(
    state: web::Data<AppState>,
    query: web::Query<CheckNowQuery>,
) -> impl Responder {
    match state.runner.run_cycle(query.owner.as_deref()).await {
        Ok(results) => HttpResponse::Ok().json(json!({
            "status": "success",
            "checked_services": results.len(),
            "results": results
                .iter()
                .map(|check| {
                    json!({
                        "service": check.name,
                        "status": check.outcome.is_up,
                        "status_code": check.outcome.status_code,
                    })
                })
                .collect::<Vec<_>>(),
        })),
        Err(err) => HttpResponse::InternalServerError().json(json!({
            "status": "error",
            "message": err.to_string(),
        })),
    }
}
