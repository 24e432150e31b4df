use actix_web::{web, HttpResponse};
use log::info;

use crate::error::ApiError;
use crate::models::fare::canonicalize_fares;
use crate::state::AppState;

/*
    /api/destinations/{id}/itinerary
*/
pub async fn get_itinerary(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let destination_id = path.into_inner();
    let payload = data.catalog.fetch_itinerary(&destination_id).await?;
    let itinerary = payload.normalize(&destination_id);

    info!(
        "Normalized {} with {} days",
        itinerary.destination_id,
        itinerary.days.len()
    );
    Ok(HttpResponse::Ok().json(itinerary))
}

/*
    /api/destinations/{id}/fares
*/
pub async fn get_fares(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let destination_id = path.into_inner();
    let fares = canonicalize_fares(data.catalog.fetch_fares(&destination_id).await?);
    Ok(HttpResponse::Ok().json(fares))
}
