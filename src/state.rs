use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::catalog::{CatalogSource, HttpCatalog, LoadError};
use crate::services::checkout_service::CheckoutLinks;
use crate::services::itinerary_view::ViewRegistry;
use crate::services::payment::PaymentOperations;
use crate::services::stripe::StripeProvider;

/// Shared by every worker through `web::Data`.
pub struct AppState {
    pub catalog: Arc<dyn CatalogSource>,
    pub payments: Arc<dyn PaymentOperations>,
    pub views: ViewRegistry,
    pub links: CheckoutLinks,
    pub currency: String,
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, LoadError> {
        let catalog = HttpCatalog::new(config.catalog_api_url.clone(), config.catalog_timeout)?;
        Ok(Self {
            catalog: Arc::new(catalog),
            payments: Arc::new(StripeProvider::new(config.stripe_secret_key.clone())),
            views: ViewRegistry::with_ttl(config.view_ttl),
            links: CheckoutLinks {
                frontend_url: config.frontend_url.clone(),
            },
            currency: config.currency.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
        })
    }
}
