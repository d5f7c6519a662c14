pub mod itinerary;
pub mod response;

pub use itinerary::{Itinerary, ItineraryDay, ItineraryRequest};
pub use response::{decode_itinerary, decode_structured};
