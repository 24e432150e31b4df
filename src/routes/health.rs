use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
    open_views: usize,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        open_views: data.views.len(),
    };

    let webhook = match &data.webhook_secret {
        Some(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Webhook signing secret configured".to_string()),
        },
        None => ServiceStatus {
            status: "disabled".to_string(),
            details: Some("STRIPE_WEBHOOK_SECRET not configured".to_string()),
        },
    };
    health
        .services
        .insert("stripe_webhook".to_string(), webhook.clone());

    health.services.insert(
        "checkout".to_string(),
        ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!(
                "Charging in {} via {}",
                data.currency.to_uppercase(),
                data.links.frontend_url
            )),
        },
    );

    if webhook.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}
