pub mod normalized;
pub mod raw;
pub mod transforms;

pub use normalized::{ActivityOption, ActivitySlot, Energy, Itinerary, ItineraryDay, SlotContent};
pub use raw::RawItineraryPayload;
