//! Core data models for the advisory gateway.
//!
//! These types represent the advice entries, profile records, and display
//! data (weather, market, schemes) that flow between the remote advisory
//! service, the fallback provider, and a rendering host.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Advice category, fixed enumerated set.
///
/// Drives the title and priority lookup tables in [`crate::normalize`];
/// never inferred from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceCategory {
    Weather,
    Disease,
    Scheme,
    Market,
    Daily,
}

/// Display priority. Styling only, never control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One normalized unit of farming guidance shown to the user.
///
/// Constructed fresh from each remote response or fallback generator call
/// and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceItem {
    pub category: AdviceCategory,
    pub title: String,
    /// English-language summary for display. Empty when the remote service
    /// signalled that it could not generate a response.
    #[serde(rename = "englishSummary")]
    pub summary: String,
    /// Response text in the farmer's language.
    #[serde(rename = "text")]
    pub localized_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub priority: Priority,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Structured sub-object attached by the remote service (treatment plan,
    /// irrigation schedule, ...). See [`crate::envelope::AdvicePayload`].
    #[serde(
        default,
        rename = "additionalData",
        skip_serializing_if = "Option::is_none"
    )]
    pub payload: Option<crate::envelope::AdvicePayload>,
    /// Contextual recommendation lists keyed off the farmer's profile.
    #[serde(
        default,
        rename = "contextualRecommendations",
        skip_serializing_if = "Option::is_none"
    )]
    pub contextual: Option<ContextualRecommendations>,
}

/// Profile-contextualized recommendation lists returned alongside advice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualRecommendations {
    #[serde(default)]
    pub weather_alerts: Vec<String>,
    #[serde(default)]
    pub crop_care: Vec<String>,
    #[serde(default)]
    pub market_tips: Vec<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(default)]
    pub related_actions: Vec<String>,
}

/// Soil classification used for profile setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilType {
    Red,
    Black,
    Loamy,
    Laterite,
    Sandy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandUnit {
    Acres,
    Hectares,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrrigationType {
    Borewell,
    Canal,
    #[serde(rename = "Rain-fed")]
    RainFed,
    Drip,
}

/// Farmer profile record.
///
/// Created at first setup and mutated only through
/// [`crate::profile::ProfileStore::update`], which also pushes the record to
/// the remote profile endpoint best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
    pub uid: String,
    pub full_name: String,
    /// Administrative region, used as locale context for advisory queries.
    pub district: String,
    pub soil_type: SoilType,
    #[serde(rename = "farmingExperience")]
    pub years_farming: u32,
    pub crops_grown: Vec<String>,
    pub land_size: f64,
    pub land_unit: LandUnit,
    pub irrigation_type: IrrigationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Daily min/max temperature band in °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

/// One day of forecast, read-only display record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub temperature: TemperatureRange,
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Expected rainfall in millimetres.
    pub rainfall: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    pub description: String,
    pub action_tip: String,
}

/// A single point in a crop's trailing price history (₹ per quintal).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: i64,
}

/// Sell/hold guidance attached to a market quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketAction {
    Sell,
    Hold,
}

/// Market snapshot for one crop: current price, trailing history, and a
/// sell/hold recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub crop_name: String,
    pub current_price: i64,
    pub price_history: Vec<PricePoint>,
    pub recommendation: MarketAction,
    pub explanation: String,
}

/// Land size band for scheme eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandSizeBand {
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

/// Eligibility criteria attached to a government scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_size: Option<LandSizeBand>,
    /// Maximum annual income in ₹.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_income: Option<i64>,
}

/// Government scheme display record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub benefit: String,
    #[serde(default)]
    pub eligibility_criteria: EligibilityCriteria,
    pub application_link: String,
    pub documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&AdviceCategory::Disease).unwrap(),
            "\"disease\""
        );
        let parsed: AdviceCategory = serde_json::from_str("\"market\"").unwrap();
        assert_eq!(parsed, AdviceCategory::Market);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(serde_json::from_str::<AdviceCategory>("\"pest\"").is_err());
    }

    #[test]
    fn irrigation_rain_fed_round_trips() {
        let json = serde_json::to_string(&IrrigationType::RainFed).unwrap();
        assert_eq!(json, "\"Rain-fed\"");
        let back: IrrigationType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, IrrigationType::RainFed);
    }
}
