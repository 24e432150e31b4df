use async_trait::async_trait;
use log::{error, info};

use crate::models::checkout::{PaymentIntentHandle, PaymentIntentRequest};
use crate::services::payment::{PaymentError, PaymentOperations};

pub struct StripeProvider {
    pub client: stripe::Client,
}

impl StripeProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: stripe::Client::new(api_key.into()),
        }
    }
}

// stripe::Currency deserializes from the lowercase ISO code
fn parse_currency(code: &str) -> Result<stripe::Currency, PaymentError> {
    serde_json::from_value(serde_json::Value::String(code.to_lowercase()))
        .map_err(|_| PaymentError::InvalidRequest(format!("Unsupported currency '{}'", code)))
}

#[async_trait]
impl PaymentOperations for StripeProvider {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentHandle, PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::InvalidRequest(format!(
                "Amount must be positive, got {}",
                request.amount
            )));
        }
        let currency = parse_currency(&request.currency)?;

        let mut create_intent = stripe::CreatePaymentIntent::new(request.amount, currency);
        create_intent.description = Some(&request.description);
        create_intent.receipt_email = Some(&request.receipt_email);
        create_intent.metadata = Some(request.metadata.clone().into_iter().collect());

        match stripe::PaymentIntent::create(&self.client, create_intent).await {
            Ok(intent) => {
                let payment_intent_id = intent.id.to_string();
                info!(
                    "Created payment intent {} for booking {}",
                    payment_intent_id, request.booking_id
                );
                match intent.client_secret {
                    Some(client_secret) => Ok(PaymentIntentHandle {
                        payment_intent_id,
                        client_secret,
                    }),
                    None => Err(PaymentError::MissingClientSecret(payment_intent_id)),
                }
            }
            Err(e) => {
                error!(
                    "Error creating payment intent for booking {}: {:?}",
                    request.booking_id, e
                );
                Err(PaymentError::Provider(e.to_string()))
            }
        }
    }
}
