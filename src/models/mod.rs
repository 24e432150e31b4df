pub mod checkout;
pub mod fare;
pub mod itinerary;
