use async_trait::async_trait;

use crate::models::checkout::{PaymentIntentHandle, PaymentIntentRequest};

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PaymentError {
    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),
    #[error("Payment provider error: {0}")]
    Provider(String),
    #[error("Payment provider returned no client secret for {0}")]
    MissingClientSecret(String),
}

/// Whatever issues payment intents for the hosted payment form.
#[async_trait]
pub trait PaymentOperations: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntentHandle, PaymentError>;
}
