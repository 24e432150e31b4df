use log::{info, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use url::Url;
use uuid::Uuid;

use crate::models::checkout::{
    CheckoutHandoff, CheckoutOutcome, CheckoutRequest, CheckoutReturn, PaymentIntentRequest,
};
use crate::models::fare::{canonicalize_fares, Fare};
use crate::services::catalog::{CatalogSource, LoadError};
use crate::services::itinerary_view::{ViewError, ViewRegistry};
use crate::services::payment::{PaymentError, PaymentOperations};
use crate::services::pricing_service::PricingService;

// Stripe rejects metadata values longer than this
const METADATA_VALUE_LIMIT: usize = 500;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("A valid email address is required before checkout")]
    MissingEmail { destination_id: String },
    #[error("At least one traveller is required")]
    EmptyParty,
    #[error("Itinerary is not ready for checkout")]
    NotReady,
    #[error("Total price {0} cannot be charged")]
    InvalidTotal(i64),
    #[error("Fare {0} is not offered for this destination")]
    UnknownFare(String),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("Could not load fares: {0}")]
    Fares(#[from] LoadError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Where checkout and the hosted payment form send the browser.
#[derive(Debug, Clone)]
pub struct CheckoutLinks {
    pub frontend_url: Url,
}

impl CheckoutLinks {
    pub fn payment_form_url(&self, client_secret: &str, booking_id: Uuid) -> Url {
        let mut url = self.page(&["checkout"]);
        url.query_pairs_mut()
            .append_pair("client_secret", client_secret)
            .append_pair("booking_id", &booking_id.to_string());
        url
    }

    pub fn return_url(&self, booking_id: Uuid) -> Url {
        let mut url = self.page(&["checkout", "success"]);
        url.query_pairs_mut()
            .append_pair("booking_id", &booking_id.to_string());
        url
    }

    /// Back to the booking step of a destination with a notice to show.
    pub fn booking_step_url(&self, destination_id: &str, notice: &str) -> Url {
        let mut url = self.page(&["booking", destination_id]);
        url.query_pairs_mut().append_pair("notice", notice);
        url
    }

    fn page(&self, segments: &[&str]) -> Url {
        let mut url = self.frontend_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

pub struct CheckoutService;

impl CheckoutService {
    pub fn valid_email(raw: Option<&str>) -> Option<String> {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        let pattern = EMAIL.get_or_init(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
        });
        raw.map(str::trim)
            .filter(|email| pattern.is_match(email))
            .map(String::from)
    }

    /// Packages the view's current total, the chosen fare and the traveller
    /// details into a payment intent, and returns what the hosted payment form
    /// needs. The amount always comes from the view, never from the request.
    pub async fn start(
        registry: &ViewRegistry,
        catalog: &dyn CatalogSource,
        payments: &dyn PaymentOperations,
        links: &CheckoutLinks,
        currency: &str,
        request: CheckoutRequest,
    ) -> Result<CheckoutHandoff, CheckoutError> {
        let priced = registry.with_view(request.view_id, |view| {
            let itinerary = view.itinerary()?;
            let selections = view.selections()?;
            Some((
                view.destination_id().to_string(),
                itinerary.name.clone(),
                PricingService::total_price(itinerary.base_price, itinerary, selections),
                serde_json::to_string(selections).unwrap_or_default(),
            ))
        })?;
        let (destination_id, itinerary_name, total_price, selections_json) =
            priced.ok_or(CheckoutError::NotReady)?;

        let email = Self::valid_email(request.email.as_deref()).ok_or_else(|| {
            CheckoutError::MissingEmail {
                destination_id: destination_id.clone(),
            }
        })?;
        if request.adults + request.children == 0 {
            return Err(CheckoutError::EmptyParty);
        }
        if total_price <= 0 {
            return Err(CheckoutError::InvalidTotal(total_price));
        }
        let amount = PricingService::to_minor_units(total_price)
            .ok_or(CheckoutError::InvalidTotal(total_price))?;

        let fare = match &request.fare_id {
            Some(fare_id) => {
                let fares = canonicalize_fares(catalog.fetch_fares(&destination_id).await?);
                Some(
                    fares
                        .into_iter()
                        .find(|fare| &fare.id == fare_id)
                        .ok_or_else(|| CheckoutError::UnknownFare(fare_id.clone()))?,
                )
            }
            None => None,
        };

        let booking_id = Uuid::new_v4();
        let metadata = Self::metadata(
            booking_id,
            &destination_id,
            total_price,
            &request,
            fare.as_ref(),
            selections_json,
        );

        let handle = payments
            .create_payment_intent(PaymentIntentRequest {
                booking_id,
                amount,
                currency: currency.to_string(),
                receipt_email: email,
                description: format!("{} booking {}", itinerary_name, booking_id),
                metadata,
            })
            .await?;

        info!(
            "Checkout for view {} handed off as booking {} ({} {})",
            request.view_id, booking_id, amount, currency
        );

        Ok(CheckoutHandoff {
            booking_id,
            payment_form_url: links
                .payment_form_url(&handle.client_secret, booking_id)
                .to_string(),
            return_url: links.return_url(booking_id).to_string(),
            payment_intent_id: handle.payment_intent_id,
            client_secret: handle.client_secret,
            total_price,
            amount,
            currency: currency.to_string(),
            fare,
        })
    }

    fn metadata(
        booking_id: Uuid,
        destination_id: &str,
        total_price: i64,
        request: &CheckoutRequest,
        fare: Option<&Fare>,
        selections_json: String,
    ) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert("booking_id".to_string(), booking_id.to_string());
        metadata.insert("destination_id".to_string(), destination_id.to_string());
        metadata.insert("total_price".to_string(), total_price.to_string());
        metadata.insert("adults".to_string(), request.adults.to_string());
        metadata.insert("children".to_string(), request.children.to_string());

        let tour_id = request
            .tour_id
            .clone()
            .or_else(|| fare.and_then(|f| f.tour_id.clone()));
        let bed_configuration = request
            .bed_configuration
            .clone()
            .or_else(|| fare.and_then(|f| f.bed_configuration.clone()));
        let optional = [
            ("tour_id", tour_id),
            ("fare_id", fare.map(|f| f.id.clone())),
            ("bed_configuration", bed_configuration),
            ("customer_name", request.customer_name.clone()),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                metadata.insert(key.to_string(), value);
            }
        }

        if selections_json.len() <= METADATA_VALUE_LIMIT {
            metadata.insert("selections".to_string(), selections_json);
        } else {
            warn!(
                "Selections for booking {} exceed the metadata limit, leaving them out",
                booking_id
            );
        }
        metadata
    }

    /// Reads the provider's return query. Only `succeeded`, or no status at
    /// all, counts as confirmed.
    pub fn interpret_return(query: &CheckoutReturn) -> CheckoutOutcome {
        let booking_id = query.booking_id.clone().filter(|id| !id.is_empty());
        let payment_ref = query.payment_intent.clone().filter(|id| !id.is_empty());

        match query.redirect_status.as_deref().map(str::trim) {
            None | Some("") => {
                warn!(
                    "Checkout return for booking {} carries no redirect_status, treating it as succeeded",
                    booking_id.as_deref().unwrap_or("<unknown>")
                );
                CheckoutOutcome::Confirmed {
                    booking_id,
                    payment_ref,
                }
            }
            Some("succeeded") => CheckoutOutcome::Confirmed {
                booking_id,
                payment_ref,
            },
            Some("processing") => CheckoutOutcome::Pending {
                booking_id,
                payment_ref,
            },
            Some(other) => CheckoutOutcome::Failed {
                booking_id,
                redirect_status: other.to_string(),
            },
        }
    }

    pub fn parse_return_url(url: &Url) -> CheckoutReturn {
        let mut query = CheckoutReturn::default();
        for (key, value) in url.query_pairs() {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "booking_id" => query.booking_id = value,
                "payment_intent" => query.payment_intent = value,
                "payment_intent_client_secret" => query.payment_intent_client_secret = value,
                "redirect_status" => query.redirect_status = value,
                _ => {}
            }
        }
        query
    }
}
