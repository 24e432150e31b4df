#![allow(dead_code)]

use actix_web::{web, App};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use voyager_api::models::checkout::{PaymentIntentHandle, PaymentIntentRequest};
use voyager_api::models::fare::RawFare;
use voyager_api::models::itinerary::RawItineraryPayload;
use voyager_api::routes;
use voyager_api::services::catalog::{CatalogSource, LoadError};
use voyager_api::services::checkout_service::CheckoutLinks;
use voyager_api::services::itinerary_view::ViewRegistry;
use voyager_api::services::payment::{PaymentError, PaymentOperations};
use voyager_api::state::AppState;

pub const FRONTEND: &str = "https://travel.example.com/";

/// Catalog double whose responses can be swapped between requests.
#[derive(Default)]
pub struct FakeCatalog {
    itineraries: Mutex<HashMap<String, Result<serde_json::Value, LoadError>>>,
    fares: Mutex<HashMap<String, serde_json::Value>>,
}

impl FakeCatalog {
    pub fn set_itinerary(&self, destination_id: &str, payload: serde_json::Value) {
        self.itineraries
            .lock()
            .unwrap()
            .insert(destination_id.to_string(), Ok(payload));
    }

    pub fn fail_itinerary(&self, destination_id: &str, err: LoadError) {
        self.itineraries
            .lock()
            .unwrap()
            .insert(destination_id.to_string(), Err(err));
    }

    pub fn set_fares(&self, destination_id: &str, fares: serde_json::Value) {
        self.fares
            .lock()
            .unwrap()
            .insert(destination_id.to_string(), fares);
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_itinerary(
        &self,
        destination_id: &str,
    ) -> Result<RawItineraryPayload, LoadError> {
        let entry = self.itineraries.lock().unwrap().get(destination_id).cloned();
        match entry {
            Some(Ok(value)) => {
                serde_json::from_value(value).map_err(|e| LoadError::Decode(e.to_string()))
            }
            Some(Err(err)) => Err(err),
            None => Err(LoadError::NotFound(destination_id.to_string())),
        }
    }

    async fn fetch_fares(&self, destination_id: &str) -> Result<Vec<RawFare>, LoadError> {
        let entry = self.fares.lock().unwrap().get(destination_id).cloned();
        match entry {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| LoadError::Decode(e.to_string()))
            }
            None => Err(LoadError::NotFound(destination_id.to_string())),
        }
    }
}

/// Records every intent request; optionally fails them all.
#[derive(Default)]
pub struct FakePayments {
    pub requests: Mutex<Vec<PaymentIntentRequest>>,
    pub fail_with: Mutex<Option<PaymentError>>,
}

#[async_trait]
impl PaymentOperations for FakePayments {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentHandle, PaymentError> {
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        Ok(PaymentIntentHandle {
            payment_intent_id: format!("pi_test_{}", count),
            client_secret: format!("pi_test_{}_secret_abc", count),
        })
    }
}

pub struct TestApp {
    pub catalog: Arc<FakeCatalog>,
    pub payments: Arc<FakePayments>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_webhook_secret(None)
    }

    pub fn with_webhook_secret(secret: Option<&str>) -> Self {
        let catalog = Arc::new(FakeCatalog::default());
        let payments = Arc::new(FakePayments::default());
        catalog.set_itinerary("bali", bali_itinerary());

        let state = web::Data::new(AppState {
            catalog: catalog.clone(),
            payments: payments.clone(),
            views: ViewRegistry::new(),
            links: CheckoutLinks {
                frontend_url: Url::parse(FRONTEND).unwrap(),
            },
            currency: "usd".to_string(),
            webhook_secret: secret.map(String::from),
        });

        Self {
            catalog,
            payments,
            state,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .configure(routes::configure)
    }
}

/// base 880; day1-inner1 changeable o1 (+0) / o2 (+50); day1-inner2 fixed;
/// day2-inner1 changeable q1 (+0) / q2 (+200); day2-inner2 customizable but empty.
pub fn bali_itinerary() -> serde_json::Value {
    json!({
        "destination": { "id": "bali", "name": "Bali Escape", "price": 880 },
        "days": [
            {
                "day": 1,
                "title": "Arrival",
                "description": "Land in Denpasar",
                "inner_items": [
                    {
                        "id": "inner1",
                        "time": "09:00",
                        "customizable": true,
                        "customize_items": [
                            { "id": "o1", "title": "Rice terraces", "price": 0, "energy": "low" },
                            { "id": "o2", "title": "Volcano sunrise", "price": 50, "energy": "high" }
                        ]
                    },
                    { "id": "inner2", "time": "19:00", "title": "Welcome dinner" }
                ]
            },
            {
                "day": 2,
                "title": "Islands",
                "inner_items": [
                    {
                        "id": "inner1",
                        "customizable": true,
                        "customize_items": [
                            { "id": "q1", "title": "Beach day", "price": 0 },
                            { "id": "q2", "title": "Nusa Penida boat", "price": "200" }
                        ]
                    },
                    { "id": "inner2", "title": "Temple visit", "customizable": true, "customize_items": [] }
                ]
            }
        ]
    })
}

pub fn fiji_itinerary() -> serde_json::Value {
    json!({
        "destination": { "id": "fiji", "name": "Fiji Islands", "base_price": 1500 },
        "days": [{
            "day": 1,
            "inner_items": [{
                "id": "inner1",
                "customizable": true,
                "customize_items": [
                    { "id": "dive", "price": 300 },
                    { "id": "snorkel", "price": 0 }
                ]
            }]
        }]
    })
}
