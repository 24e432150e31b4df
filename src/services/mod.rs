pub mod catalog;
pub mod checkout_service;
pub mod customization_dialog;
pub mod itinerary_view;
pub mod payment;
pub mod pricing_service;
pub mod selection_store;
pub mod stripe;
