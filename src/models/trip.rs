use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A trip the user has already taken
///
/// Only `destinationName` feeds the personalization prompt; the remaining
/// trip-record fields are accepted so clients can post stored trips as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastTrip {
    pub destination_name: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub plan_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub trip_highlights: Option<String>,
    #[serde(default)]
    pub link_pdf: Option<String>,
    #[serde(default)]
    pub img_link: Option<String>,
}

impl PastTrip {
    pub fn new(destination_name: impl Into<String>) -> Self {
        Self {
            destination_name: destination_name.into(),
            user_id: None,
            plan_date: None,
            start_date: None,
            end_date: None,
            trip_highlights: None,
            link_pdf: None,
            img_link: None,
        }
    }
}

// ============================================================================
// Personalized Suggestion Types
// ============================================================================

/// A single suggested trip plus the reasoning behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub data: SuggestedTrip,
    pub explanation: Explanation,
}

/// Trip skeleton the client can use to pre-fill a planning form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedTrip {
    pub destination: SuggestedLocation,
    #[serde(default = "default_specific_place")]
    pub is_specific_place: bool,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_travelers")]
    pub travelers: u32,
    #[serde(default)]
    pub accommodations: BTreeMap<String, bool>,
    #[serde(default)]
    pub trip_styles: BTreeMap<String, bool>,
    #[serde(default)]
    pub activities: BTreeMap<String, bool>,
    #[serde(default)]
    pub dining: BTreeMap<String, bool>,
    #[serde(default)]
    pub transportation: BTreeMap<String, bool>,
}

/// Suggested location; the model fills `state` for US places and `country` otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedLocation {
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub summary: String,
    #[serde(default)]
    pub travel_history: Option<String>,
    pub highlights: Vec<String>,
}

fn default_specific_place() -> bool {
    true
}

fn default_travelers() -> u32 {
    1
}
