//! Prompt synthesis for destination recommendations
//!
//! Turns a [`TravelRequest`] into a natural-language prompt that embeds the exact
//! JSON contract the sanitizer later enforces. Output is deterministic for a given
//! request and dialect.

use crate::models::{BasicInfo, TravelRequest};
use crate::services::providers::GenerationConfig;

/// First-level regions that switch the response to a multi-destination `{city, state}` shape
const US_STATES: [&str; 50] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

/// True when `place` names a US state
pub fn is_first_level_region(place: &str) -> bool {
    let place = place.trim();
    US_STATES.iter().any(|state| state.eq_ignore_ascii_case(place))
}

/// Prompt wording and sampling constants for one text provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDialect {
    Gemini,
    OpenAi,
}

/// Location shape the provider is asked to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationShape {
    CityState,
    CityCountry,
}

/// How many destinations the provider is asked to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationCount {
    Exactly(u8),
    Between(u8, u8),
}

/// Shape and count policy chosen for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationPolicy {
    pub shape: LocationShape,
    pub count: DestinationCount,
    pub detailed_highlights: bool,
}

const MULTI_DESTINATION: DestinationCount = DestinationCount::Between(5, 6);
const SINGLE_DESTINATION: DestinationCount = DestinationCount::Exactly(1);

impl LocationShape {
    fn schema(self) -> &'static str {
        match self {
            LocationShape::CityState => r#"{"city": string, "state": string}"#,
            LocationShape::CityCountry => r#"{"city": string, "country": string}"#,
        }
    }
}

impl DestinationCount {
    fn describe(self) -> String {
        match self {
            DestinationCount::Exactly(1) => "exactly 1 destination".to_string(),
            DestinationCount::Exactly(n) => format!("exactly {n} destinations"),
            DestinationCount::Between(low, high) => format!("{low}-{high} destinations"),
        }
    }
}

impl DestinationPolicy {
    fn highlights(&self) -> &'static str {
        if self.detailed_highlights {
            "7-10 specific highlights"
        } else {
            "5-7 highlights"
        }
    }
}

impl PromptDialect {
    /// Sampling parameters used for recommendation text
    pub fn sampling(self) -> GenerationConfig {
        match self {
            PromptDialect::Gemini => GenerationConfig {
                temperature: 0.9,
                top_p: Some(0.8),
                top_k: Some(40),
                max_tokens: None,
            },
            PromptDialect::OpenAi => GenerationConfig {
                temperature: 0.7,
                top_p: None,
                top_k: None,
                max_tokens: Some(1500),
            },
        }
    }

    /// Picks location shape and destination count for a request
    pub fn policy(self, info: &BasicInfo) -> DestinationPolicy {
        let specific_place = if info.is_specific_place {
            info.specific_place()
        } else {
            None
        };

        let (shape, count) = match (self, specific_place) {
            (PromptDialect::Gemini, Some(place)) if is_first_level_region(place) => {
                (LocationShape::CityState, MULTI_DESTINATION)
            }
            (_, Some(_)) => (LocationShape::CityCountry, SINGLE_DESTINATION),
            (_, None) => (LocationShape::CityCountry, MULTI_DESTINATION),
        };

        DestinationPolicy {
            shape,
            count,
            detailed_highlights: info.is_specific_place,
        }
    }

    /// Builds the destination recommendation prompt for a request
    pub fn destinations_prompt(self, request: &TravelRequest) -> String {
        let info = &request.basic_info;
        let policy = self.policy(info);

        format!(
            "As an AI travel planner, {task}:\n\n\
             {basic}\n\n\
             {preferences}\n\n\
             Dining Preferences:\n{dining}\n\n\
             Activities:\n{activities}\n\n\
             {instructions}\n\n\
             Format the response as a JSON object with the following structure:\n\
             {schema}\n\n\
             {closing}",
            task = self.task(info, &policy),
            basic = basic_info_section(info),
            preferences = preferences_section(request),
            dining = request.dining_preferences.join(", "),
            activities = request.activities.join(", "),
            instructions = self.instructions(),
            schema = self.schema(&policy),
            closing = self.closing(),
        )
    }

    fn task(self, info: &BasicInfo, policy: &DestinationPolicy) -> String {
        match (info.is_specific_place, info.specific_place()) {
            (true, Some(place)) if policy.count == MULTI_DESTINATION => {
                format!("suggest 5-6 top travel destinations in {place}")
            }
            (true, Some(place)) => format!("provide detailed travel information for {place}"),
            _ => match info.destination_area() {
                Some(area) => format!("suggest 5 to 6 travel destinations located in {area}"),
                None => "suggest 5 to 6 travel destinations".to_string(),
            },
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            PromptDialect::Gemini => {
                "For each destination, provide:\n\
                 1. Location details (format depends on destination type)\n\
                 2. A brief description (2-3 sentences) that includes:\n   \
                 - The location's geographic position\n   \
                 - Why it matches their preferences\n\
                 3. 5-7 specific trip highlights or recommended activities"
            }
            PromptDialect::OpenAi => {
                "For each destination, provide:\n\
                 1. City and Country name\n\
                 2. A brief description (2-3 sentences) that includes:\n   \
                 - The location (state/province/region and geographic position in the country)\n   \
                 - Why it matches their preferences\n\
                 3. 5-7 specific trip highlights or recommended activities"
            }
        }
    }

    fn schema(self, policy: &DestinationPolicy) -> String {
        let (location_note, description_note) = match self {
            PromptDialect::Gemini => (
                "Format depends on location type",
                "Brief overview of the destination",
            ),
            PromptDialect::OpenAi => (
                "For specific places, use the exact location provided",
                "Include detailed location information",
            ),
        };

        format!(
            "{{\n  \
             \"destinations\": [  // Will contain {count}\n    \
             {{\n      \
             \"destination\": {shape},  // {location_note}\n      \
             \"description\": string,  // {description_note}\n      \
             \"highlights\": string[]  // Array of {highlights}\n    \
             }}\n  \
             ]\n\
             }}",
            count = policy.count.describe(),
            shape = policy.shape.schema(),
            highlights = policy.highlights(),
        )
    }

    fn closing(self) -> &'static str {
        match self {
            PromptDialect::Gemini => {
                "IMPORTANT: Ensure the response is a valid JSON object with all required fields."
            }
            PromptDialect::OpenAi => {
                "Ensure the suggestions are highly personalized based on all preferences and \
                 provide specific, actionable recommendations."
            }
        }
    }
}

fn basic_info_section(info: &BasicInfo) -> String {
    let (destination_type, location) = if info.is_specific_place {
        ("Specific Place", info.specific_place().unwrap_or_default())
    } else {
        (
            "Country",
            info.destination_area().unwrap_or("Open to suggestions"),
        )
    };

    format!(
        "Basic Information:\n\
         - Destination Type: {destination_type}\n\
         - Location: {location}\n\
         - Travel Dates: {} to {}\n\
         - Number of Travelers: {}",
        info.start_date, info.end_date, info.travelers
    )
}

fn preferences_section(request: &TravelRequest) -> String {
    let prefs = &request.travel_preferences;
    format!(
        "Travel Preferences:\n\
         - Trip Styles: {}\n\
         - Accommodation Types: {}\n\
         - Transportation: {}",
        prefs.trip_styles.join(", "),
        prefs.accommodation.join(", "),
        prefs.transportation.join(", ")
    )
}

/// Prompt for a destination photograph
///
/// Inline providers get the detailed composition brief; hosted providers work
/// best with a single descriptive sentence.
pub fn image_prompt(city: &str, location_label: &str, is_regional: bool, detailed: bool) -> String {
    let place = if is_regional {
        format!("{city}, {location_label}, USA")
    } else {
        format!("{city}, {location_label}")
    };

    if detailed {
        format!(
            "Generate a stunning, professional travel photograph of {place}.\n\
             Focus: Iconic landmarks, beautiful cityscapes, or natural wonders.\n\
             Style: High-quality travel photography, photorealistic, cinematic.\n\
             Composition: Wide angle, dramatic lighting, perfect exposure.\n\
             Resolution: 1024x1024, sharp details, vibrant colors."
        )
    } else {
        format!(
            "A beautiful, professional travel photograph of {place}. Show iconic landmarks or \
             cityscapes that capture the essence of the destination. Style: high-quality travel \
             photography, 4K, realistic."
        )
    }
}
