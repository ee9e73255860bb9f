use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Structured travel preferences submitted by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequest {
    pub basic_info: BasicInfo,
    pub travel_preferences: TravelPreferences,
    #[serde(default)]
    pub dining_preferences: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

/// Where and when the user wants to travel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    /// True when the user named one concrete place (a city, state or country)
    pub is_specific_place: bool,
    #[serde(default)]
    pub specific_place: Option<String>,
    /// Broader area to draw suggestions from when no specific place was chosen
    #[serde(default)]
    pub destination: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub travelers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelPreferences {
    #[serde(default)]
    pub trip_styles: Vec<String>,
    #[serde(default)]
    pub accommodation: Vec<String>,
    #[serde(default)]
    pub transportation: Vec<String>,
}

impl BasicInfo {
    /// The specific place, trimmed, if one was given
    pub fn specific_place(&self) -> Option<&str> {
        self.specific_place
            .as_deref()
            .map(str::trim)
            .filter(|place| !place.is_empty())
    }

    /// The broader destination area, trimmed, if one was given
    pub fn destination_area(&self) -> Option<&str> {
        self.destination
            .as_deref()
            .map(str::trim)
            .filter(|area| !area.is_empty())
    }
}

impl TravelRequest {
    /// Rejects requests the prompt synthesizer cannot describe meaningfully
    pub fn validate(&self) -> AppResult<()> {
        if self.basic_info.is_specific_place && self.basic_info.specific_place().is_none() {
            return Err(AppError::InvalidInput(
                "specificPlace is required when isSpecificPlace is true".to_string(),
            ));
        }

        if self.basic_info.travelers == 0 {
            return Err(AppError::InvalidInput(
                "travelers must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json(is_specific_place: bool, specific_place: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "basicInfo": {
                "isSpecificPlace": is_specific_place,
                "specificPlace": specific_place,
                "startDate": "2026-11-01",
                "endDate": "2026-11-08",
                "travelers": 2
            },
            "travelPreferences": {
                "tripStyles": ["cultural"],
                "accommodation": ["hotel"],
                "transportation": ["train"]
            },
            "diningPreferences": ["localCuisine"],
            "activities": ["museums"]
        })
    }

    #[test]
    fn test_deserialize_camel_case_request() {
        let request: TravelRequest =
            serde_json::from_value(request_json(true, Some("France"))).unwrap();

        assert!(request.basic_info.is_specific_place);
        assert_eq!(request.basic_info.specific_place(), Some("France"));
        assert_eq!(request.basic_info.destination_area(), None);
        assert_eq!(request.travel_preferences.trip_styles, vec!["cultural"]);
        assert_eq!(request.dining_preferences, vec!["localCuisine"]);
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        let request: TravelRequest =
            serde_json::from_value(request_json(true, Some("Kyoto"))).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_specific_place() {
        let request: TravelRequest =
            serde_json::from_value(request_json(true, Some("   "))).unwrap();

        let err = request.validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("specificPlace"));
    }

    #[test]
    fn test_validate_rejects_zero_travelers() {
        let mut request: TravelRequest =
            serde_json::from_value(request_json(false, None)).unwrap();
        request.basic_info.travelers = 0;

        assert!(matches!(
            request.validate(),
            Err(AppError::InvalidInput(_))
        ));
    }
}
