//! Query orchestration and dashboard assembly.
//!
//! [`AdvisorSession`] ties the pieces together for one signed-in farmer:
//!
//! ```text
//! capture ──▶ (image pre-processor) ──▶ remote query client ──▶ normalizer ──▶ advice list
//!                                              │
//!                                         on failure
//!                                              ▼
//!                                    fallback provider (dashboard views only)
//! ```
//!
//! Two failure policies live here, deliberately asymmetric:
//!
//! - **Advice queries** (`ask_text` / `ask_audio` / `analyze_image`):
//!   failure clears any stale advice and surfaces the error. Mock advice
//!   is never substituted: fabricated agronomic guidance is riskier than
//!   fabricated weather.
//! - **Dashboard reads** (`dashboard`): failure substitutes the fallback
//!   provider's data, tagged [`Provenance::Fallback`], so the weather,
//!   market, and scheme views never show a hard error.
//!
//! Each call runs strictly sequentially within itself; nothing here spawns
//! background work, and no ordering is guaranteed across independent calls.

use chrono::{NaiveDate, Utc};

use crate::capture::AudioClip;
use crate::client::AdviceSource;
use crate::config::ImageConfig;
use crate::envelope::QueryRequest;
use crate::error::AdvisoryError;
use crate::fallback;
use crate::image_prep;
use crate::models::{AdviceItem, FarmerProfile, MarketQuote, SchemeDescriptor, WeatherDay};
use crate::normalize;

/// Whether a dashboard was assembled from the remote service or from the
/// fallback provider. Callers use this for user messaging; it never
/// changes the data shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Live,
    Fallback,
}

/// Fully-shaped dashboard content: weather, market, schemes, daily plan.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub weather: Vec<WeatherDay>,
    pub market: Vec<MarketQuote>,
    pub schemes: Vec<SchemeDescriptor>,
    pub daily_plan: Option<AdviceItem>,
    pub provenance: Provenance,
}

/// Fallback market quotes are limited to the first three profile crops.
const FALLBACK_MARKET_CROPS: usize = 3;

/// One farmer's advisory session: the remote source, the profile that
/// supplies locale context, and the transient advice list.
pub struct AdvisorSession<S: AdviceSource> {
    source: S,
    profile: FarmerProfile,
    image: ImageConfig,
    advice: Vec<AdviceItem>,
}

impl<S: AdviceSource> AdvisorSession<S> {
    pub fn new(source: S, profile: FarmerProfile, image: ImageConfig) -> Self {
        Self {
            source,
            profile,
            image,
            advice: Vec::new(),
        }
    }

    pub fn profile(&self) -> &FarmerProfile {
        &self.profile
    }

    /// The advice produced by the most recent successful query. Empty
    /// after a failed query.
    pub fn advice(&self) -> &[AdviceItem] {
        &self.advice
    }

    fn request(&self) -> crate::envelope::QueryRequestBuilder {
        QueryRequest::builder(self.profile.uid.as_str(), self.profile.district.as_str())
    }

    /// Submit a text query and replace the advice list with the
    /// normalized result.
    pub async fn ask_text(&mut self, text: &str) -> Result<&[AdviceItem], AdvisoryError> {
        let request = self.request().text(text).build();
        self.run_query(request).await
    }

    /// Submit a recorded voice query.
    pub async fn ask_audio(&mut self, clip: &AudioClip) -> Result<&[AdviceItem], AdvisoryError> {
        let request = self.request().audio_base64(clip.to_base64()).build();
        self.run_query(request).await
    }

    /// Compress a crop photo and submit it, optionally with accompanying
    /// text. Compression happens before any network I/O.
    pub async fn analyze_image(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        query: Option<&str>,
    ) -> Result<&[AdviceItem], AdvisoryError> {
        let compressed = image_prep::compress(
            bytes,
            file_name,
            self.image.max_dimension,
            self.image.quality,
        );
        let request = compressed.and_then(|compressed| {
            let mut builder = self.request().image_base64(compressed.to_base64());
            if let Some(text) = query {
                builder = builder.text(text);
            }
            builder.build()
        });
        self.run_query(request).await
    }

    async fn run_query(
        &mut self,
        request: Result<QueryRequest, AdvisoryError>,
    ) -> Result<&[AdviceItem], AdvisoryError> {
        let outcome = match request {
            Ok(request) => self.source.submit_query(&request).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(data) => {
                self.advice = normalize::normalize(&data, Utc::now());
                Ok(&self.advice)
            }
            Err(err) => {
                // Stale advice must not outlive a failed query.
                self.advice.clear();
                Err(err)
            }
        }
    }

    /// Assemble the dashboard. Never fails: a remote failure logs a
    /// warning and substitutes fallback data for every view.
    pub async fn dashboard(&self, today: NaiveDate) -> Dashboard {
        match self.source.recommendations(&self.profile.uid).await {
            Ok(data) => Dashboard {
                weather: data.weather,
                market: data.market,
                schemes: data.schemes,
                daily_plan: data.daily_plan,
                provenance: Provenance::Live,
            },
            Err(err) => {
                tracing::warn!(error = %err, "recommendations fetch failed, using fallback data");
                let crops: Vec<String> = self
                    .profile
                    .crops_grown
                    .iter()
                    .take(FALLBACK_MARKET_CROPS)
                    .cloned()
                    .collect();
                Dashboard {
                    weather: fallback::weather_forecast(today),
                    market: fallback::market_quotes(&crops, today),
                    schemes: fallback::schemes(),
                    daily_plan: Some(fallback::daily_plan()),
                    provenance: Provenance::Fallback,
                }
            }
        }
    }
}
