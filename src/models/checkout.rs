use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::fare::Fare;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CheckoutRequest {
    pub view_id: Uuid,
    #[serde(default)]
    pub tour_id: Option<String>,
    #[serde(default)]
    pub fare_id: Option<String>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub bed_configuration: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

fn default_adults() -> u32 {
    1
}

/// What the payment provider is asked to charge. Built from the view, never
/// from client-supplied amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentRequest {
    pub booking_id: Uuid,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub receipt_email: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentHandle {
    pub payment_intent_id: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CheckoutHandoff {
    pub booking_id: Uuid,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub total_price: i64,
    pub amount: i64,
    pub currency: String,
    pub fare: Option<Fare>,
    pub payment_form_url: String,
    pub return_url: String,
}

/// Query parameters the provider appends when redirecting back after payment.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CheckoutReturn {
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub payment_intent_client_secret: Option<String>,
    #[serde(default)]
    pub redirect_status: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Confirmed {
        booking_id: Option<String>,
        payment_ref: Option<String>,
    },
    Pending {
        booking_id: Option<String>,
        payment_ref: Option<String>,
    },
    Failed {
        booking_id: Option<String>,
        redirect_status: String,
    },
}
