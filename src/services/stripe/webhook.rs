use log::{info, warn};
use stripe::{EventObject, EventType, Webhook};

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    PaymentSucceeded {
        payment_intent_id: String,
        booking_id: Option<String>,
    },
    PaymentFailed {
        payment_intent_id: String,
        booking_id: Option<String>,
    },
    Ignored(String),
}

/// Verifies the signature and classifies the event. Nothing is mutated here;
/// the outcome is only logged by the caller.
pub fn process_event(
    payload: &str,
    signature: &str,
    secret: &str,
) -> Result<WebhookOutcome, stripe::WebhookError> {
    let event = Webhook::construct_event(payload, signature, secret)?;

    let outcome = match (event.type_, event.data.object) {
        (EventType::PaymentIntentSucceeded, EventObject::PaymentIntent(intent)) => {
            let booking_id = intent.metadata.get("booking_id").cloned();
            info!(
                "Payment {} succeeded for booking {}",
                intent.id,
                booking_id.as_deref().unwrap_or("<unknown>")
            );
            WebhookOutcome::PaymentSucceeded {
                payment_intent_id: intent.id.to_string(),
                booking_id,
            }
        }
        (EventType::PaymentIntentPaymentFailed, EventObject::PaymentIntent(intent)) => {
            let booking_id = intent.metadata.get("booking_id").cloned();
            warn!(
                "Payment {} failed for booking {}",
                intent.id,
                booking_id.as_deref().unwrap_or("<unknown>")
            );
            WebhookOutcome::PaymentFailed {
                payment_intent_id: intent.id.to_string(),
                booking_id,
            }
        }
        (other, _) => {
            info!("Unhandled event type: {:?}", other);
            WebhookOutcome::Ignored(format!("{:?}", other))
        }
    };

    Ok(outcome)
}
