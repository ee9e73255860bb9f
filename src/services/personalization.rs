//! Personalized trip suggestions from travel history
//!
//! Builds the prompt for a single new-destination suggestion. The only
//! non-deterministic input is the diversification directive, which comes from a
//! [`DirectivePicker`] so tests can pin it.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

use crate::models::PastTrip;

/// Phrasings that nudge the model away from the user's usual pattern
pub const DIRECTIVES: [&str; 8] = [
    "be bold and suggest a very different vibe",
    "be slightly adventurous and suggest a hidden gem",
    "think globally and suggest a destination far from past trips",
    "suggest a location with a similar culture but in a different country",
    "recommend a famous underrated travel spot",
    "favor a place that tourists often miss",
    "think outside the box and suggest lesser-known destinations",
    "surprise the user with an unexpected but wonderful location",
];

const ACCOMMODATIONS: &[&str] = &[
    "hotel",
    "hotel_and_resort",
    "boutique_hotel",
    "local_homestay",
    "vacation_rental",
    "hostel",
];

const TRIP_STYLES: &[&str] = &[
    "relaxation",
    "adventure",
    "cultural",
    "shopping",
    "luxury",
    "beach",
    "hiking",
    "budget-friendly",
    "outdoor",
    "urban",
    "foodWine",
    "historical",
];

const ACTIVITIES: &[&str] = &[
    "hiking",
    "sightseeing",
    "museums",
    "local_markets",
    "adventure_sports",
    "beach_activities",
    "nightlife",
    "photography",
    "cooking_classes",
    "wildlife",
];

const DINING: &[&str] = &[
    "restaurant",
    "localCuisine",
    "streetFood",
    "fineDining",
    "vegetarianVegan",
    "seafood",
    "dairyFree",
    "bar",
    "cafe",
    "pub",
    "vietnamese",
    "italian",
    "mexican",
    "thai",
    "indian",
    "japanese",
    "chinese",
    "korean",
];

const TRANSPORTATION: &[&str] = &[
    "car_rental",
    "public_transport",
    "taxi",
    "walking",
    "biking",
    "train",
    "bus",
    "boat",
];

/// Source of the diversification directive
pub trait DirectivePicker: Send + Sync {
    fn pick(&self, directives: &[&'static str]) -> &'static str;
}

/// Uniformly random choice using the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDirectivePicker;

impl DirectivePicker for RandomDirectivePicker {
    fn pick(&self, directives: &[&'static str]) -> &'static str {
        directives
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DIRECTIVES[0])
    }
}

/// Always picks the directive at a fixed index (wrapping)
#[derive(Debug, Clone, Copy)]
pub struct FixedDirectivePicker(pub usize);

impl DirectivePicker for FixedDirectivePicker {
    fn pick(&self, directives: &[&'static str]) -> &'static str {
        if directives.is_empty() {
            return DIRECTIVES[0];
        }
        directives[self.0 % directives.len()]
    }
}

/// Visit counts per destination name
pub fn visit_counts(trips: &[PastTrip]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for trip in trips {
        *counts.entry(trip.destination_name.trim()).or_insert(0) += 1;
    }
    counts
}

/// Bulleted `- <name> (visited <n> times)` block
pub fn history_block(trips: &[PastTrip]) -> String {
    let counts = visit_counts(trips);
    if counts.is_empty() {
        return "- No previous trips recorded".to_string();
    }

    counts
        .iter()
        .map(|(destination, count)| format!("- {destination} (visited {count} times)"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the single-suggestion prompt
pub fn suggestion_prompt(trips: &[PastTrip], directive: &str, today: NaiveDate) -> String {
    format!(
        "As an AI travel planner, analyze this user's travel history and recommend a new destination:\n\n\
         Travel History:\n{history}\n\n\
         Today's date is {today}. Based on these past trips, {directive}. \
         Also, suggest a NEW and DIFFERENT destination that:\n\
         1. Has some similarities to their past preferences but offers unique experiences\n\
         2. Is NOT one of their previously visited places\n\
         3. Could be in a different region or country while maintaining similar interests\n\
         4. Provides a fresh perspective on their preferred travel style\n\n\
         IMPORTANT: Plan the trip to start at least one week after today's date. \
         Do not suggest dates in the immediate future or past dates.\n\n\
         Provide your recommendation in this JSON format:\n{schema}\n",
        history = history_block(trips),
        today = today.format("%Y-%m-%d"),
        schema = suggestion_schema(),
    )
}

fn boolean_map(name: &str, keys: &[&str]) -> String {
    let fields = keys
        .iter()
        .map(|key| format!("      \"{key}\": boolean"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("    \"{name}\": {{\n{fields}\n    }}")
}

fn suggestion_schema() -> String {
    let preferences = [
        boolean_map("accommodations", ACCOMMODATIONS),
        boolean_map("tripStyles", TRIP_STYLES),
        boolean_map("activities", ACTIVITIES),
        boolean_map("dining", DINING),
        boolean_map("transportation", TRANSPORTATION),
    ]
    .join(",\n");

    format!(
        "{{\n  \
         \"data\": {{\n    \
         \"destination\": {{\n      \
         \"city\": string,     // City name\n      \
         \"state\": string,    // State name (for US locations)\n      \
         \"country\": string   // Country name (for non-US locations)\n    \
         }},\n    \
         \"isSpecificPlace\": true,\n    \
         \"startDate\": string,    // Suggest a good time to visit (YYYY-MM-DD)\n    \
         \"endDate\": string,      // Suggest trip duration (YYYY-MM-DD)\n    \
         \"travelers\": 1,         // Default to 1\n\
         {preferences}\n  \
         }},\n  \
         \"explanation\": {{\n    \
         \"summary\": string,        // Brief summary of why this destination was chosen\n    \
         \"travelHistory\": string,  // How it relates to past trips\n    \
         \"highlights\": string[]    // Key points about the recommendation\n  \
         }}\n\
         }}"
    )
}
