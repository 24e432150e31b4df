use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::itinerary_view::ViewError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DestinationInput {
    pub destination_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionInput {
    pub slot_id: String,
    pub option_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DialogOpenInput {
    pub slot_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DialogStageInput {
    pub option_id: String,
}

fn destination(input: DestinationInput) -> Result<String, ApiError> {
    let destination_id = input.destination_id.trim().to_string();
    if destination_id.is_empty() {
        return Err(ApiError::BadRequest("destination_id is required".to_string()));
    }
    Ok(destination_id)
}

fn snapshot(data: &AppState, view_id: Uuid) -> Result<HttpResponse, ApiError> {
    Ok(data
        .views
        .with_view(view_id, |view| HttpResponse::Ok().json(view.snapshot()))?)
}

/*
    POST /api/views
*/
pub async fn create(
    data: web::Data<AppState>,
    input: web::Json<DestinationInput>,
) -> Result<HttpResponse, ApiError> {
    let destination_id = destination(input.into_inner())?;
    let view_id = data.views.create(&destination_id);
    data.views.load(data.catalog.as_ref(), view_id).await?;

    Ok(data
        .views
        .with_view(view_id, |view| HttpResponse::Created().json(view.snapshot()))?)
}

/*
    GET /api/views/{view_id}
*/
pub async fn get(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    snapshot(&data, path.into_inner())
}

/*
    POST /api/views/{view_id}/refresh
*/
pub async fn refresh(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let view_id = path.into_inner();
    data.views.load(data.catalog.as_ref(), view_id).await?;
    snapshot(&data, view_id)
}

/*
    PUT /api/views/{view_id}/destination
*/
pub async fn switch_destination(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    input: web::Json<DestinationInput>,
) -> Result<HttpResponse, ApiError> {
    let view_id = path.into_inner();
    let destination_id = destination(input.into_inner())?;
    data.views
        .with_view_mut(view_id, |view| view.switch_destination(destination_id))?;
    data.views.load(data.catalog.as_ref(), view_id).await?;
    snapshot(&data, view_id)
}

/*
    DELETE /api/views/{view_id}
*/
pub async fn remove(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let view_id = path.into_inner();
    if data.views.remove(view_id) {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ViewError::NotFound(view_id).into())
    }
}

/*
    POST /api/views/{view_id}/selections
*/
pub async fn confirm_selection(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    input: web::Json<SelectionInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let body = data.views.with_view_mut(path.into_inner(), |view| {
        let outcome = view.confirm_selection(&input.slot_id, &input.option_id)?;
        Ok::<_, ViewError>(json!({
            "applied": outcome.applied(),
            "outcome": outcome,
            "selections": view.selections(),
            "total_price": view.total_price(),
        }))
    })??;
    Ok(HttpResponse::Ok().json(body))
}

/*
    POST /api/views/{view_id}/dialog
*/
pub async fn open_dialog(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    input: web::Json<DialogOpenInput>,
) -> Result<HttpResponse, ApiError> {
    let view_id = path.into_inner();
    data.views
        .with_view_mut(view_id, |view| view.open_dialog(&input.slot_id))??;
    snapshot(&data, view_id)
}

/*
    PUT /api/views/{view_id}/dialog
*/
pub async fn stage_option(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    input: web::Json<DialogStageInput>,
) -> Result<HttpResponse, ApiError> {
    let view_id = path.into_inner();
    let staged = data
        .views
        .with_view_mut(view_id, |view| view.stage_option(&input.option_id))??;
    if !staged {
        return Err(ApiError::BadRequest(format!(
            "Option {} is not offered for this slot",
            input.option_id
        )));
    }
    snapshot(&data, view_id)
}

/*
    POST /api/views/{view_id}/dialog/confirm
*/
pub async fn confirm_dialog(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = data.views.with_view_mut(path.into_inner(), |view| {
        let outcome = view.confirm_dialog()?;
        Ok::<_, ViewError>(json!({
            "applied": outcome.is_some_and(|o| o.applied()),
            "outcome": outcome,
            "selections": view.selections(),
            "total_price": view.total_price(),
        }))
    })??;
    Ok(HttpResponse::Ok().json(body))
}

/*
    DELETE /api/views/{view_id}/dialog
*/
pub async fn cancel_dialog(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let closed = data
        .views
        .with_view_mut(path.into_inner(), |view| view.cancel_dialog())?;
    Ok(HttpResponse::Ok().json(json!({ "closed": closed })))
}
