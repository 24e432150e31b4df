use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::config::ConfigError;
use crate::services::catalog::LoadError;
use crate::services::checkout_service::CheckoutError;
use crate::services::itinerary_view::ViewError;
use crate::services::payment::PaymentError;

/// Error type for every handler; renders as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not load: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unavailable(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Load(err) => load_status(err),
            ApiError::View(err) => view_status(err),
            ApiError::Checkout(err) => match err {
                CheckoutError::MissingEmail { .. }
                | CheckoutError::EmptyParty
                | CheckoutError::InvalidTotal(_)
                | CheckoutError::UnknownFare(_) => StatusCode::BAD_REQUEST,
                CheckoutError::NotReady => StatusCode::CONFLICT,
                CheckoutError::View(err) => view_status(err),
                CheckoutError::Fares(err) => load_status(err),
                CheckoutError::Payment(err) => payment_status(err),
            },
            ApiError::Payment(err) => payment_status(err),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

fn load_status(err: &LoadError) -> StatusCode {
    match err {
        LoadError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn view_status(err: &ViewError) -> StatusCode {
    match err {
        ViewError::NotFound(_) => StatusCode::NOT_FOUND,
        ViewError::NotReady => StatusCode::CONFLICT,
        ViewError::UnknownSlot(_) => StatusCode::NOT_FOUND,
        ViewError::NoDialog => StatusCode::CONFLICT,
    }
}

fn payment_status(err: &PaymentError) -> StatusCode {
    match err {
        PaymentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        PaymentError::Provider(_) | PaymentError::MissingClientSecret(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}
