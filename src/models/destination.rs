use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// City plus exactly one of state or country
///
/// The invariant is enforced on deserialization: provider output carrying both
/// `state` and `country`, or neither, is rejected before it reaches the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation", into = "RawLocation")]
pub struct DestinationLocation {
    pub city: String,
    pub region: LocationRegion,
}

/// The administrative area a destination city belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationRegion {
    /// First-level region such as a US state
    State(String),
    Country(String),
}

/// Wire shape of a location: `{city, state}` or `{city, country}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLocation {
    city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

impl TryFrom<RawLocation> for DestinationLocation {
    type Error = String;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        let region = match (raw.state, raw.country) {
            (Some(state), None) => LocationRegion::State(state),
            (None, Some(country)) => LocationRegion::Country(country),
            (Some(_), Some(_)) => {
                return Err("location must have either state or country, not both".to_string())
            }
            (None, None) => return Err("location must have a state or a country".to_string()),
        };

        Ok(Self {
            city: raw.city,
            region,
        })
    }
}

impl From<DestinationLocation> for RawLocation {
    fn from(location: DestinationLocation) -> Self {
        let (state, country) = match location.region {
            LocationRegion::State(state) => (Some(state), None),
            LocationRegion::Country(country) => (None, Some(country)),
        };

        RawLocation {
            city: location.city,
            state,
            country,
        }
    }
}

impl DestinationLocation {
    pub fn in_state(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            region: LocationRegion::State(state.into()),
        }
    }

    pub fn in_country(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            region: LocationRegion::Country(country.into()),
        }
    }

    /// State or country name, whichever the location carries
    pub fn label(&self) -> &str {
        match &self.region {
            LocationRegion::State(state) => state,
            LocationRegion::Country(country) => country,
        }
    }

    /// True for locations inside a first-level region (US state)
    pub fn is_regional(&self) -> bool {
        matches!(self.region, LocationRegion::State(_))
    }
}

impl Display for DestinationLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.city, self.label())
    }
}

/// A single recommended destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub destination: DestinationLocation,
    pub description: String,
    pub highlights: Vec<String>,
    /// Data URI or hosted URL, filled in after image synthesis
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Destinations in the order the provider returned them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationsResponse {
    pub destinations: Vec<Destination>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_with_state() {
        let location: DestinationLocation =
            serde_json::from_value(json!({ "city": "Austin", "state": "Texas" })).unwrap();

        assert_eq!(location, DestinationLocation::in_state("Austin", "Texas"));
        assert!(location.is_regional());
        assert_eq!(location.label(), "Texas");
        assert_eq!(location.to_string(), "Austin, Texas");
    }

    #[test]
    fn test_location_with_country() {
        let location: DestinationLocation =
            serde_json::from_value(json!({ "city": "Lyon", "country": "France" })).unwrap();

        assert!(!location.is_regional());
        assert_eq!(location.label(), "France");
    }

    #[test]
    fn test_location_rejects_state_and_country() {
        let result = serde_json::from_value::<DestinationLocation>(json!({
            "city": "Austin",
            "state": "Texas",
            "country": "USA"
        }));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("not both"));
    }

    #[test]
    fn test_location_rejects_missing_region() {
        let result = serde_json::from_value::<DestinationLocation>(json!({ "city": "Nowhere" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_location_serializes_only_its_region() {
        let value =
            serde_json::to_value(DestinationLocation::in_country("Lyon", "France")).unwrap();
        assert_eq!(value, json!({ "city": "Lyon", "country": "France" }));

        let value = serde_json::to_value(DestinationLocation::in_state("Moab", "Utah")).unwrap();
        assert_eq!(value, json!({ "city": "Moab", "state": "Utah" }));
    }

    #[test]
    fn test_destination_serializes_null_image_url() {
        let destination = Destination {
            destination: DestinationLocation::in_country("Lyon", "France"),
            description: "Gastronomic capital".to_string(),
            highlights: vec!["Vieux Lyon".to_string()],
            image_url: None,
        };

        let value = serde_json::to_value(&destination).unwrap();
        assert_eq!(value["imageUrl"], serde_json::Value::Null);
        assert_eq!(value["destination"]["city"], "Lyon");
    }
}
