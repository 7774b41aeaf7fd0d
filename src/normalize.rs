//! Advice normalization.
//!
//! Maps the heterogeneous `/query` response envelope into the uniform
//! ordered list of [`AdviceItem`]s the rest of the system renders.
//!
//! Rules, in order:
//!
//! 1. The primary response text becomes the first entry, titled by the
//!    fixed category→title table.
//! 2. Priority comes from the fixed category→priority table
//!    (disease→high, weather/market/daily→medium, scheme→low). This is a
//!    business rule: any priority signal the backend sends is overridden.
//! 3. A secondary `recommendations` array is appended verbatim, in the
//!    order received. Never re-sorted.
//! 4. A primary text matching the "could not generate" sentinel suppresses
//!    the UI-facing summary, but the entry is still emitted so contextual
//!    sub-sections stay visible.
//!
//! Normalization is pure: the same envelope and receive time always yield
//! deep-equal output.

use chrono::{DateTime, Utc};

use crate::envelope::QueryResponseData;
use crate::models::{AdviceCategory, AdviceItem, Priority};

/// Phrases the advisory service uses when generation failed. Compared
/// case-insensitively against the primary response text.
const GENERATION_FAILED_SENTINELS: [&str; 2] = [
    "could not generate",
    "unable to generate",
];

/// Fixed category→title table.
pub fn title_for(category: AdviceCategory) -> &'static str {
    match category {
        AdviceCategory::Weather => "Weather & Irrigation",
        AdviceCategory::Disease => "Disease Diagnosis",
        AdviceCategory::Scheme => "Scheme Suggestions",
        AdviceCategory::Market => "Market Tips",
        AdviceCategory::Daily => "Today's Action Plan",
    }
}

/// Fixed category→priority table.
pub fn priority_for(category: AdviceCategory) -> Priority {
    match category {
        AdviceCategory::Disease => Priority::High,
        AdviceCategory::Weather | AdviceCategory::Market | AdviceCategory::Daily => {
            Priority::Medium
        }
        AdviceCategory::Scheme => Priority::Low,
    }
}

fn is_generation_failure(text: &str) -> bool {
    let lowered = text.to_lowercase();
    GENERATION_FAILED_SENTINELS
        .iter()
        .any(|sentinel| lowered.contains(sentinel))
}

/// Normalize a `/query` response into the ordered advice list.
///
/// `received_at` stamps entries when the envelope carries no server-side
/// timestamp; pass the moment the response was received.
pub fn normalize(data: &QueryResponseData, received_at: DateTime<Utc>) -> Vec<AdviceItem> {
    let created_at = data.timestamp.unwrap_or(received_at);
    let summary = if is_generation_failure(&data.response) {
        String::new()
    } else {
        data.response.clone()
    };

    let primary = AdviceItem {
        category: data.category,
        title: title_for(data.category).to_string(),
        summary,
        localized_text: data.response.clone(),
        audio_url: data.audio_url.clone(),
        image_url: None,
        priority: priority_for(data.category),
        created_at,
        payload: data.payload.clone(),
        contextual: data.contextual.clone(),
    };

    let mut items = Vec::with_capacity(1 + data.recommendations.as_ref().map_or(0, Vec::len));
    items.push(primary);
    if let Some(recommendations) = &data.recommendations {
        items.extend(recommendations.iter().cloned());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::AdvicePayload;
    use crate::models::ContextualRecommendations;

    fn received_at() -> DateTime<Utc> {
        "2026-08-07T06:30:00Z".parse().unwrap()
    }

    fn disease_response() -> QueryResponseData {
        serde_json::from_value(serde_json::json!({
            "response": "Your crop shows signs of leaf spot. Apply copper-based fungicide.",
            "audioUrl": "https://cdn.example/advice-123.mp3",
            "category": "disease",
            "confidence": 0.92,
            "additionalData": {
                "treatment": ["Apply copper-based fungicide", "Remove affected leaves"],
                "cost": "₹500 per acre"
            }
        }))
        .unwrap()
    }

    #[test]
    fn primary_entry_uses_lookup_tables() {
        let items = normalize(&disease_response(), received_at());
        assert_eq!(items.len(), 1);
        let first = &items[0];
        assert_eq!(first.category, AdviceCategory::Disease);
        assert_eq!(first.title, "Disease Diagnosis");
        assert_eq!(first.priority, Priority::High);
        assert_eq!(first.audio_url.as_deref(), Some("https://cdn.example/advice-123.mp3"));
        assert!(matches!(first.payload, Some(AdvicePayload::Treatment { .. })));
    }

    #[test]
    fn priority_table_is_fixed() {
        assert_eq!(priority_for(AdviceCategory::Disease), Priority::High);
        assert_eq!(priority_for(AdviceCategory::Weather), Priority::Medium);
        assert_eq!(priority_for(AdviceCategory::Market), Priority::Medium);
        assert_eq!(priority_for(AdviceCategory::Daily), Priority::Medium);
        assert_eq!(priority_for(AdviceCategory::Scheme), Priority::Low);
    }

    #[test]
    fn normalize_is_idempotent() {
        let data = disease_response();
        assert_eq!(normalize(&data, received_at()), normalize(&data, received_at()));
    }

    #[test]
    fn recommendations_append_verbatim_in_order() {
        let data: QueryResponseData = serde_json::from_value(serde_json::json!({
            "response": "ಟೊಮೇಟೊ ಬೆಲೆಗಳು ಏರುತ್ತಿವೆ",
            "category": "market",
            "recommendations": [
                {
                    "category": "scheme",
                    "title": "Scheme Suggestions",
                    "englishSummary": "You are eligible for PM-KISAN.",
                    "text": "ನೀವು PM-KISAN ಯೋಜನೆಗೆ ಅರ್ಹರಾಗಿದ್ದೀರಿ",
                    "priority": "low",
                    "timestamp": "2026-08-07T06:00:00Z"
                },
                {
                    "category": "disease",
                    "title": "Disease Diagnosis",
                    "englishSummary": "Watch for early blight this week.",
                    "text": "ಈ ವಾರ ಅರ್ಲಿ ಬ್ಲೈಟ್ ಬಗ್ಗೆ ಎಚ್ಚರವಹಿಸಿ",
                    "priority": "high",
                    "timestamp": "2026-08-07T06:00:00Z"
                }
            ]
        }))
        .unwrap();

        let items = normalize(&data, received_at());
        assert_eq!(items.len(), 3);
        // Appended order preserved: the high-priority disease entry stays
        // after the low-priority scheme entry.
        assert_eq!(items[1].category, AdviceCategory::Scheme);
        assert_eq!(items[2].category, AdviceCategory::Disease);
    }

    #[test]
    fn server_timestamp_wins_over_receive_time() {
        let data: QueryResponseData = serde_json::from_value(serde_json::json!({
            "response": "Reduce irrigation before the rain.",
            "category": "weather",
            "timestamp": "2026-08-06T18:00:00Z"
        }))
        .unwrap();
        let items = normalize(&data, received_at());
        assert_eq!(items[0].created_at, "2026-08-06T18:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn generation_failure_suppresses_summary_but_keeps_entry() {
        let data: QueryResponseData = serde_json::from_value(serde_json::json!({
            "response": "Sorry, I could not generate a response for this query.",
            "category": "daily",
            "contextualRecommendations": {
                "weatherAlerts": ["Moderate rain expected next week."],
                "cropCare": [],
                "marketTips": [],
                "schemes": [],
                "relatedActions": []
            }
        }))
        .unwrap();

        let items = normalize(&data, received_at());
        assert_eq!(items.len(), 1);
        assert!(items[0].summary.is_empty());
        // Contextual sub-sections survive so the UI still has content.
        let contextual = items[0].contextual.as_ref().unwrap();
        assert_eq!(contextual.weather_alerts.len(), 1);
    }

    #[test]
    fn normal_text_is_not_suppressed() {
        let data: QueryResponseData = serde_json::from_value(serde_json::json!({
            "response": "Prices could not stay this high for long; sell soon.",
            "category": "market"
        }))
        .unwrap();
        // "could not" alone is not the sentinel.
        let items = normalize(&data, received_at());
        assert!(!items[0].summary.is_empty());
    }

    #[test]
    fn contextual_recommendations_default_cleanly() {
        let empty = ContextualRecommendations::default();
        assert!(empty.weather_alerts.is_empty());
    }
}
