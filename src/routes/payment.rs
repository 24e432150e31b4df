use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;

use crate::error::ApiError;
use crate::models::checkout::{CheckoutRequest, CheckoutReturn};
use crate::services::checkout_service::{CheckoutError, CheckoutService};
use crate::services::stripe::webhook::{process_event, WebhookOutcome};
use crate::state::AppState;

/*
    POST /api/payment/checkout
*/
pub async fn checkout(
    data: web::Data<AppState>,
    input: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();
    info!("Starting checkout for view {}", request.view_id);

    let result = CheckoutService::start(
        &data.views,
        data.catalog.as_ref(),
        data.payments.as_ref(),
        &data.links,
        &data.currency,
        request,
    )
    .await;

    match result {
        Ok(handoff) => Ok(HttpResponse::Ok().json(handoff)),
        // Validation failures send the browser back to the booking step
        Err(CheckoutError::MissingEmail { destination_id }) => {
            let location = data
                .links
                .booking_step_url(&destination_id, "email_required");
            Ok(HttpResponse::SeeOther()
                .insert_header((header::LOCATION, location.to_string()))
                .finish())
        }
        Err(err) => {
            error!("Checkout failed: {}", err);
            Err(err.into())
        }
    }
}

/*
    GET /api/payment/success?booking_id=..&payment_intent=..&redirect_status=..
*/
pub async fn success(query: web::Query<CheckoutReturn>) -> impl Responder {
    HttpResponse::Ok().json(CheckoutService::interpret_return(&query))
}

/*
    POST /api/payment/webhook
*/
pub async fn webhook(
    req: HttpRequest,
    payload: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let secret = data
        .webhook_secret
        .as_deref()
        .ok_or_else(|| ApiError::Unavailable("Webhook secret is not configured".to_string()))?;

    let signature = req
        .headers()
        .get("stripe-signature")
        .and_then(|sig| sig.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing stripe-signature header".to_string()))?;

    let payload = std::str::from_utf8(&payload)
        .map_err(|_| ApiError::BadRequest("Invalid payload encoding".to_string()))?;

    match process_event(payload, signature, secret) {
        Ok(outcome) => {
            let handled = !matches!(outcome, WebhookOutcome::Ignored(_));
            Ok(HttpResponse::Ok().json(json!({ "received": true, "handled": handled })))
        }
        Err(e) => {
            error!("Webhook error: {:?}", e);
            Err(ApiError::BadRequest(format!("Webhook error: {}", e)))
        }
    }
}
