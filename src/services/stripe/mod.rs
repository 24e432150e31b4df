pub mod provider;
pub mod webhook;

pub use provider::StripeProvider;
