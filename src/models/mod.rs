mod destination;
mod travel_request;
mod trip;

pub use destination::{Destination, DestinationLocation, DestinationsResponse, LocationRegion};
pub use travel_request::{BasicInfo, TravelPreferences, TravelRequest};
pub use trip::{Explanation, PastTrip, RecommendationResult, SuggestedLocation, SuggestedTrip};
