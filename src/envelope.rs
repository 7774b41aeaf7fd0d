//! Wire shapes for the remote advisory API.
//!
//! Every endpoint exchanges the same top-level wrapper:
//!
//! ```json
//! { "success": true, "data": { ... }, "error": null }
//! ```
//!
//! modeled here as [`Envelope<T>`]. The structured sub-objects the advisory
//! service attaches to an answer arrive as [`AdvicePayload`], an explicit
//! tagged union of the known response shapes with a catch-all
//! [`AdvicePayload::Opaque`] variant. Loosely-typed maps never travel
//! through the rest of the crate.
//!
//! # Endpoints
//!
//! | Method | Path | Request | Response data |
//! |--------|------|---------|---------------|
//! | `POST` | `/query` | [`QueryRequest`] | [`QueryResponseData`] |
//! | `GET`  | `/recommendations/:uid` | — | [`RecommendationsData`] |
//! | `POST` | `/users` | [`UpsertProfileRequest`] | [`ProfileData`] |
//! | `GET`  | `/users/:uid` | — | [`ProfileData`] |
//! | `GET`  | `/health` | — | [`HealthCheck`] (flat, no envelope) |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdvisoryError;
use crate::models::{
    AdviceCategory, AdviceItem, ContextualRecommendations, FarmerProfile, MarketQuote,
    PricePoint, SchemeDescriptor, WeatherDay,
};

/// Top-level JSON wrapper returned by every enveloped endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload of a 2xx response.
    ///
    /// A 2xx body with `success: false` or without `data` is a contract
    /// violation and maps to [`AdvisoryError::MalformedResponse`].
    pub fn into_data(self) -> Result<T, AdvisoryError> {
        if self.success == Some(false) {
            let detail = self
                .error
                .unwrap_or_else(|| "success=false without error detail".to_string());
            return Err(AdvisoryError::MalformedResponse(detail));
        }
        self.data.ok_or_else(|| {
            AdvisoryError::MalformedResponse("envelope missing data field".to_string())
        })
    }
}

/// Locale context attached to every query.
///
/// The advisory service uses the district to contextualize structured
/// sub-recommendations, so it is sent even for image-only queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationContext {
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Body of `POST /query`. Build via [`QueryRequest::builder`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64-encoded image bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Base64-encoded audio bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    pub location: LocationContext,
}

impl QueryRequest {
    pub fn builder(uid: impl Into<String>, district: impl Into<String>) -> QueryRequestBuilder {
        QueryRequestBuilder {
            uid: uid.into(),
            district: district.into(),
            state: None,
            text: None,
            image: None,
            audio_data: None,
        }
    }
}

/// Builder enforcing the "at least one of text / image / audio" rule
/// before any network I/O happens.
#[derive(Debug, Clone)]
pub struct QueryRequestBuilder {
    uid: String,
    district: String,
    state: Option<String>,
    text: Option<String>,
    image: Option<String>,
    audio_data: Option<String>,
}

impl QueryRequestBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.text = Some(text);
        }
        self
    }

    pub fn image_base64(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn audio_base64(mut self, audio: impl Into<String>) -> Self {
        self.audio_data = Some(audio.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Fails with [`AdvisoryError::InvalidQuery`] when no input modality is set.
    pub fn build(self) -> Result<QueryRequest, AdvisoryError> {
        if self.text.is_none() && self.image.is_none() && self.audio_data.is_none() {
            return Err(AdvisoryError::InvalidQuery(
                "at least one of text, image, or audio is required".to_string(),
            ));
        }
        Ok(QueryRequest {
            uid: self.uid,
            text: self.text,
            image: self.image,
            audio_data: self.audio_data,
            location: LocationContext {
                district: self.district,
                state: self.state,
            },
        })
    }
}

/// Sell/hold/wait signal inside a market payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSignal {
    Sell,
    Hold,
    Wait,
}

/// Structured sub-object attached to an advisory answer.
///
/// The variants cover the shapes the service is known to emit; anything
/// else lands in [`AdvicePayload::Opaque`] untouched, so an evolving
/// backend never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdvicePayload {
    /// Disease answers: treatment steps plus an optional cost estimate.
    #[serde(rename_all = "camelCase")]
    Treatment {
        treatment: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost: Option<String>,
    },
    /// Weather answers: an irrigation schedule and soil-moisture guidance.
    #[serde(rename_all = "camelCase")]
    Irrigation {
        water_schedule: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        soil_moisture: Option<String>,
    },
    /// Market answers: a sell/hold/wait signal with trailing price data.
    #[serde(rename_all = "camelCase")]
    Market {
        recommendation: MarketSignal,
        #[serde(default)]
        price_data: Vec<PricePoint>,
    },
    /// Scheme answers: names of schemes the farmer appears eligible for.
    #[serde(rename_all = "camelCase")]
    Schemes { eligible_schemes: Vec<String> },
    /// Unrecognized extension shape, carried verbatim.
    Opaque(serde_json::Value),
}

/// `data` payload of `POST /query`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponseData {
    /// Primary response text in the farmer's language.
    pub response: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    pub category: AdviceCategory,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Server-side generation time; normalization falls back to the
    /// receive time when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, rename = "additionalData")]
    pub payload: Option<AdvicePayload>,
    #[serde(default, rename = "contextualRecommendations")]
    pub contextual: Option<ContextualRecommendations>,
    /// Secondary, already-shaped advice entries appended verbatim by the
    /// normalizer.
    #[serde(default)]
    pub recommendations: Option<Vec<AdviceItem>>,
}

/// `data` payload of `GET /recommendations/:uid`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsData {
    #[serde(default)]
    pub weather: Vec<WeatherDay>,
    #[serde(default)]
    pub market: Vec<MarketQuote>,
    #[serde(default)]
    pub schemes: Vec<SchemeDescriptor>,
    #[serde(default)]
    pub daily_plan: Option<AdviceItem>,
}

/// Body of `POST /users`.
#[derive(Debug, Serialize)]
pub struct UpsertProfileRequest<'a> {
    pub uid: &'a str,
    pub profile: &'a FarmerProfile,
}

/// `data` payload of the profile endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileData {
    pub user: FarmerProfile,
}

/// `GET /health` response. The one endpoint that answers flat,
/// without the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthCheck {
    #[serde(default)]
    pub success: Option<bool>,
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_empty_query() {
        let err = QueryRequest::builder("u1", "Mysuru").build().unwrap_err();
        assert!(matches!(err, AdvisoryError::InvalidQuery(_)));
    }

    #[test]
    fn builder_ignores_blank_text() {
        let err = QueryRequest::builder("u1", "Mysuru")
            .text("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, AdvisoryError::InvalidQuery(_)));
    }

    #[test]
    fn request_serializes_spec_field_names() {
        let req = QueryRequest::builder("u1", "Mysuru")
            .text("yellow leaves on tomato")
            .audio_base64("QUJD")
            .build()
            .unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["uid"], "u1");
        assert_eq!(json["text"], "yellow leaves on tomato");
        assert_eq!(json["audioData"], "QUJD");
        assert_eq!(json["location"]["district"], "Mysuru");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn image_only_request_still_carries_district() {
        let req = QueryRequest::builder("u1", "Kolar")
            .image_base64("aGk=")
            .build()
            .unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["location"]["district"], "Kolar");
    }

    #[test]
    fn payload_parses_known_treatment_shape() {
        let json = serde_json::json!({
            "treatment": ["Apply copper-based fungicide", "Remove affected leaves"],
            "cost": "₹500 per acre"
        });
        let payload: AdvicePayload = serde_json::from_value(json).unwrap();
        assert!(matches!(payload, AdvicePayload::Treatment { .. }));
    }

    #[test]
    fn payload_falls_back_to_opaque() {
        let json = serde_json::json!({ "pestIndex": 7, "sprayWindow": "evening" });
        let payload: AdvicePayload = serde_json::from_value(json.clone()).unwrap();
        match payload {
            AdvicePayload::Opaque(value) => assert_eq!(value, json),
            other => panic!("expected opaque, got {other:?}"),
        }
    }

    #[test]
    fn envelope_without_data_is_malformed() {
        let env: Envelope<QueryResponseData> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        let err = env.into_data().unwrap_err();
        assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
    }

    #[test]
    fn envelope_success_false_surfaces_error_text() {
        let env: Envelope<QueryResponseData> =
            serde_json::from_str(r#"{"success": false, "error": "model offline"}"#).unwrap();
        match env.into_data().unwrap_err() {
            AdvisoryError::MalformedResponse(msg) => assert_eq!(msg, "model offline"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
