//! Static substitute data for weather, market, and scheme views.
//!
//! Invoked only when the remote advisory service fails, so the dashboard
//! never renders an empty error state for those views. Callers track
//! provenance (`Live` vs `Fallback`, see [`crate::advisor::Provenance`]);
//! substitute data is never silently conflated with real data.
//!
//! All generators are deterministic: the market series is seeded from the
//! crop name, so the same crop list and date always produce the same
//! quotes. Values are illustrative, not observations.

use chrono::{Duration, NaiveDate, Utc};

use crate::models::{
    AdviceCategory, AdviceItem, EligibilityCriteria, LandSizeBand, MarketAction, MarketQuote,
    PricePoint, Priority, SchemeDescriptor, TemperatureRange, WeatherDay,
};

/// One forecast day per entry, starting today.
const FORECAST: [(&str, f64, f64, u8, f64, f64, &str); 7] = [
    (
        "Partly Cloudy",
        18.0,
        28.0,
        65,
        0.0,
        12.0,
        "Good day for irrigation and pesticide application. Monitor soil moisture levels.",
    ),
    (
        "Light Rain",
        20.0,
        30.0,
        70,
        5.0,
        8.0,
        "Avoid irrigation today. Check drainage systems and cover harvested crops.",
    ),
    (
        "Sunny",
        19.0,
        29.0,
        60,
        0.0,
        10.0,
        "Perfect for harvesting mature crops. Apply post-harvest treatments.",
    ),
    (
        "Clear Sky",
        21.0,
        31.0,
        55,
        0.0,
        15.0,
        "Ideal for field preparation and sowing. Ensure adequate water supply.",
    ),
    (
        "Partly Cloudy",
        22.0,
        32.0,
        58,
        2.0,
        12.0,
        "Light rain expected. Good for transplanting seedlings.",
    ),
    (
        "Moderate Rain",
        20.0,
        28.0,
        72,
        15.0,
        18.0,
        "Heavy rain expected. Ensure proper drainage and avoid field work.",
    ),
    (
        "Light Rain",
        19.0,
        27.0,
        68,
        8.0,
        14.0,
        "Post-rain activities. Check for water logging and pest issues.",
    ),
];

/// Seven-day forecast starting at `today`.
pub fn weather_forecast(today: NaiveDate) -> Vec<WeatherDay> {
    FORECAST
        .iter()
        .enumerate()
        .map(
            |(i, &(description, min, max, humidity, rainfall, wind, tip))| WeatherDay {
                date: today + Duration::days(i as i64),
                temperature: TemperatureRange { min, max },
                humidity,
                rainfall,
                wind_speed: wind,
                description: description.to_string(),
                action_tip: tip.to_string(),
            },
        )
        .collect()
}

/// Reference mandi prices in ₹ per quintal.
fn base_price(crop: &str) -> i64 {
    match crop {
        "Rice (Paddy)" => 2500,
        "Maize" => 2000,
        "Jowar" => 2800,
        "Bajra" => 2600,
        "Ragi" => 3500,
        "Cotton" => 6000,
        "Sugarcane" => 350,
        "Groundnut" => 5500,
        "Sunflower" => 6200,
        "Safflower" => 5800,
        "Sesame" => 8000,
        "Castor" => 4500,
        "Red Chili" => 12000,
        "Turmeric" => 8500,
        "Coriander" => 9500,
        "Tomato" => 2500,
        "Onion" => 2200,
        "Potato" => 2000,
        "Brinjal" => 3000,
        "Okra" => 4000,
        "Mango" => 3500,
        "Banana" => 2800,
        "Grapes" => 5000,
        "Pomegranate" => 8000,
        "Orange" => 3000,
        "Coconut" => 2500,
        "Areca nut" => 35000,
        _ => 3000,
    }
}

// FNV-1a over the crop name. Keeps the series stable for a given crop
// without pulling in an RNG for illustrative data.
fn crop_seed(name: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

// Deterministic jitter in [-spread, +spread].
fn jitter(seed: u64, index: u64, spread: i64) -> i64 {
    let mut x = seed ^ index.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    (x % (2 * spread as u64 + 1)) as i64 - spread
}

/// One quote per crop: current price, a 21-point trailing history in
/// strictly increasing date order ending at `today`, and a sell/hold
/// recommendation from comparing the current price to the crop's base
/// price.
pub fn market_quotes(crops: &[String], today: NaiveDate) -> Vec<MarketQuote> {
    crops
        .iter()
        .map(|crop| {
            let base = base_price(crop);
            let seed = crop_seed(crop);
            let current_price = base + jitter(seed, 1_000, 10);

            let price_history = (0..21)
                .map(|i| PricePoint {
                    date: today - Duration::days(20 - i),
                    price: base + jitter(seed, i as u64, 15),
                })
                .collect();

            let recommendation = if current_price > base {
                MarketAction::Sell
            } else {
                MarketAction::Hold
            };
            let explanation = match recommendation {
                MarketAction::Sell => format!(
                    "Current price is above average. Good time to sell if quality is good. (₹{current_price}/quintal)"
                ),
                MarketAction::Hold => format!(
                    "Current price is below average. Consider waiting for better prices or explore value addition. (₹{current_price}/quintal)"
                ),
            };

            MarketQuote {
                crop_name: crop.clone(),
                current_price,
                price_history,
                recommendation,
                explanation,
            }
        })
        .collect()
}

/// Fixed list of central and Karnataka state schemes.
pub fn schemes() -> Vec<SchemeDescriptor> {
    vec![
        SchemeDescriptor {
            id: "pm-kisan".to_string(),
            name: "PM-KISAN".to_string(),
            description: "Income support scheme providing financial assistance to small and marginal farmers"
                .to_string(),
            benefit: "₹6,000 per year in three installments".to_string(),
            eligibility_criteria: EligibilityCriteria {
                land_size: Some(LandSizeBand {
                    min: 0.0,
                    max: 2.0,
                    unit: "hectares".to_string(),
                }),
                max_income: Some(200_000),
            },
            application_link: "https://pmkisan.gov.in".to_string(),
            documents: vec![
                "Aadhaar Card".to_string(),
                "Land Records".to_string(),
                "Bank Account Details".to_string(),
                "Passport Size Photo".to_string(),
            ],
            deadline: NaiveDate::from_ymd_opt(2025, 3, 31),
        },
        SchemeDescriptor {
            id: "raitha-bandhu".to_string(),
            name: "Raitha Bandhu".to_string(),
            description: "Karnataka state investment support scheme for farmers".to_string(),
            benefit: "₹10,000 per hectare per season".to_string(),
            eligibility_criteria: EligibilityCriteria {
                land_size: Some(LandSizeBand {
                    min: 0.0,
                    max: 10.0,
                    unit: "hectares".to_string(),
                }),
                max_income: None,
            },
            application_link: "https://raitamitra.karnataka.gov.in".to_string(),
            documents: vec![
                "Land Records".to_string(),
                "Aadhaar Card".to_string(),
                "Bank Passbook".to_string(),
            ],
            deadline: None,
        },
        SchemeDescriptor {
            id: "krishi-sinchai".to_string(),
            name: "Pradhan Mantri Krishi Sinchai Yojana".to_string(),
            description: "Scheme to expand cultivated area with assured irrigation".to_string(),
            benefit: "Up to 90% subsidy on drip irrigation systems".to_string(),
            eligibility_criteria: EligibilityCriteria {
                land_size: Some(LandSizeBand {
                    min: 0.5,
                    max: 50.0,
                    unit: "hectares".to_string(),
                }),
                max_income: None,
            },
            application_link: "https://pmksy.gov.in".to_string(),
            documents: vec![
                "Land Documents".to_string(),
                "Aadhaar Card".to_string(),
                "Bank Details".to_string(),
                "Water Source Certificate".to_string(),
            ],
            deadline: None,
        },
        SchemeDescriptor {
            id: "soil-health".to_string(),
            name: "Soil Health Card Scheme".to_string(),
            description: "Free soil testing and nutrient recommendations".to_string(),
            benefit: "Free soil testing worth ₹500-1000".to_string(),
            eligibility_criteria: EligibilityCriteria::default(),
            application_link: "https://soilhealth.dac.gov.in".to_string(),
            documents: vec!["Land Records".to_string(), "Aadhaar Card".to_string()],
            deadline: None,
        },
        SchemeDescriptor {
            id: "kisan-credit".to_string(),
            name: "Kisan Credit Card".to_string(),
            description: "Short-term credit support for farming expenses".to_string(),
            benefit: "Credit up to ₹3 lakhs at 4% interest".to_string(),
            eligibility_criteria: EligibilityCriteria {
                land_size: Some(LandSizeBand {
                    min: 0.1,
                    max: 100.0,
                    unit: "hectares".to_string(),
                }),
                max_income: None,
            },
            application_link: "https://www.nabard.org/kcc.aspx".to_string(),
            documents: vec![
                "Land Records".to_string(),
                "Aadhaar Card".to_string(),
                "PAN Card".to_string(),
                "Bank Statements".to_string(),
            ],
            deadline: None,
        },
    ]
}

/// Static daily action plan shown when the recommendations endpoint is down.
pub fn daily_plan() -> AdviceItem {
    AdviceItem {
        category: AdviceCategory::Daily,
        title: "Today's Action Plan".to_string(),
        summary: "Focus on irrigation and check for pests. Weather is favorable for fieldwork."
            .to_string(),
        localized_text:
            "Focus on irrigation and check for pests. Weather is favorable for fieldwork."
                .to_string(),
        audio_url: None,
        image_url: None,
        priority: Priority::Medium,
        created_at: Utc::now(),
        payload: None,
        contextual: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn forecast_is_seven_consecutive_days() {
        let forecast = weather_forecast(today());
        assert_eq!(forecast.len(), 7);
        for (i, day) in forecast.iter().enumerate() {
            assert_eq!(day.date, today() + Duration::days(i as i64));
            assert!(day.temperature.min < day.temperature.max);
            assert!(!day.action_tip.is_empty());
        }
    }

    #[test]
    fn one_quote_per_crop_with_21_point_history() {
        let crops: Vec<String> = ["Tomato", "Onion", "Ragi", "Areca nut"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let quotes = market_quotes(&crops, today());
        assert_eq!(quotes.len(), crops.len());
        for quote in &quotes {
            assert_eq!(quote.price_history.len(), 21);
            assert_eq!(quote.price_history.last().unwrap().date, today());
            for pair in quote.price_history.windows(2) {
                assert!(pair[0].date < pair[1].date, "history must strictly increase");
            }
        }
    }

    #[test]
    fn quotes_are_deterministic() {
        let crops = vec!["Tomato".to_string(), "Cotton".to_string()];
        assert_eq!(
            market_quotes(&crops, today()),
            market_quotes(&crops, today())
        );
    }

    #[test]
    fn recommendation_tracks_base_price() {
        let crops = vec!["Tomato".to_string()];
        let quote = &market_quotes(&crops, today())[0];
        let expected = if quote.current_price > 2500 {
            MarketAction::Sell
        } else {
            MarketAction::Hold
        };
        assert_eq!(quote.recommendation, expected);
    }

    #[test]
    fn unknown_crop_uses_default_base() {
        let crops = vec!["Dragonfruit".to_string()];
        let quote = &market_quotes(&crops, today())[0];
        assert!((quote.current_price - 3000).abs() <= 10);
    }

    #[test]
    fn scheme_ids_are_unique() {
        let schemes = schemes();
        assert_eq!(schemes.len(), 5);
        let mut ids: Vec<_> = schemes.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
