//! # Krishi Saarthi CLI (`saarthi`)
//!
//! The `saarthi` binary drives the advisory gateway from the terminal:
//! queries, crop photo analysis, the dashboard views, profile setup, and
//! the transcription proxy.
//!
//! ## Usage
//!
//! ```bash
//! saarthi --config ./config/saarthi.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `saarthi ask "<query>"` | Submit a text query and print the advice |
//! | `saarthi ask-audio <file>` | Submit a recorded voice query |
//! | `saarthi analyze <image>` | Compress and submit a crop photo |
//! | `saarthi dashboard` | Weather, market, and scheme views |
//! | `saarthi profile show` | Print the local profile |
//! | `saarthi profile set ...` | Create or update the profile |
//! | `saarthi health` | Probe the advisory endpoint |
//! | `saarthi serve speech` | Start the transcription proxy |
//!
//! ## Examples
//!
//! ```bash
//! # First-time setup
//! saarthi profile set --uid u1 --name "Ravi Kumar" --district Mysuru \
//!     --crops "Tomato,Onion" --land-size 2.5
//!
//! # Ask about a sick plant
//! saarthi ask "yellow leaves on my tomato plants"
//!
//! # Analyze a crop photo with accompanying text
//! saarthi analyze ./leaf.jpg --query "white spots underneath"
//!
//! # Start the speech proxy for browser clients
//! SPEECH_TO_TEXT_API_KEY=... saarthi serve speech
//! ```

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use krishi_saarthi::advisor::{AdvisorSession, Provenance};
use krishi_saarthi::capture::AudioClip;
use krishi_saarthi::client::AdvisoryClient;
use krishi_saarthi::config;
use krishi_saarthi::models::{
    AdviceItem, FarmerProfile, IrrigationType, LandUnit, Priority, SoilType,
};
use krishi_saarthi::profile::ProfileStore;
use krishi_saarthi::server;

/// Krishi Saarthi, a farmer advisory gateway.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; built-in defaults are used when the file does not exist.
#[derive(Parser)]
#[command(
    name = "saarthi",
    about = "Krishi Saarthi: voice/image/text farm advisory from the terminal",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/saarthi.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Submit a text query and print the normalized advice.
    Ask {
        /// The question, in any supported language.
        query: String,
    },

    /// Submit a recorded voice query from an audio file.
    AskAudio {
        /// Path to the audio file (WEBM/Opus as produced by browser recorders).
        audio: PathBuf,
    },

    /// Compress a crop photo and submit it for analysis.
    Analyze {
        /// Path to the image file.
        image: PathBuf,

        /// Optional accompanying text query.
        #[arg(long)]
        query: Option<String>,
    },

    /// Show weather, market, and scheme views.
    ///
    /// Falls back to built-in substitute data when the advisory service
    /// is unreachable, and says so.
    Dashboard,

    /// Manage the local farmer profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Probe the advisory endpoint's health.
    Health,

    /// Start a gateway service.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Profile subcommands.
#[derive(Subcommand)]
enum ProfileAction {
    /// Print the locally stored profile.
    Show,

    /// Create or update the profile. Also pushes the record to the remote
    /// profile endpoint, best-effort.
    Set {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        name: String,
        /// District used as locale context for queries (e.g. Mysuru).
        #[arg(long)]
        district: String,
        /// Soil type: Red, Black, Loamy, Laterite, or Sandy.
        #[arg(long, default_value = "Loamy")]
        soil: String,
        /// Years of farming experience.
        #[arg(long, default_value_t = 0)]
        experience: u32,
        /// Comma-separated crop list, e.g. "Tomato,Onion,Ragi".
        #[arg(long, value_delimiter = ',')]
        crops: Vec<String>,
        #[arg(long)]
        land_size: f64,
        /// acres or hectares.
        #[arg(long, default_value = "acres")]
        land_unit: String,
        /// Borewell, Canal, Rain-fed, or Drip.
        #[arg(long, default_value = "Borewell")]
        irrigation: String,
        #[arg(long)]
        phone: Option<String>,
    },
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Start the speech-to-text proxy on `[server].bind`.
    Speech,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Ask { query } => {
            let mut session = open_session(&cfg)?;
            match session.ask_text(&query).await {
                Ok(advice) => print_advice(advice),
                Err(err) => bail!("advice query failed: {err}"),
            }
        }
        Commands::AskAudio { audio } => {
            let bytes = std::fs::read(&audio)
                .with_context(|| format!("Failed to read audio: {}", audio.display()))?;
            let clip = AudioClip::new(bytes, "audio/webm");
            let mut session = open_session(&cfg)?;
            match session.ask_audio(&clip).await {
                Ok(advice) => print_advice(advice),
                Err(err) => bail!("voice query failed: {err}"),
            }
        }
        Commands::Analyze { image, query } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read image: {}", image.display()))?;
            let file_name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.jpg".to_string());
            let mut session = open_session(&cfg)?;
            match session
                .analyze_image(&bytes, &file_name, query.as_deref())
                .await
            {
                Ok(advice) => print_advice(advice),
                Err(err) => bail!("image analysis failed: {err}"),
            }
        }
        Commands::Dashboard => {
            let session = open_session(&cfg)?;
            let dashboard = session.dashboard(Utc::now().date_naive()).await;
            print_dashboard(&dashboard);
        }
        Commands::Profile { action } => match action {
            ProfileAction::Show => {
                let store = ProfileStore::new(&cfg.profile);
                match store.load()? {
                    Some(profile) => print_profile(&profile),
                    None => println!("No profile found. Run `saarthi profile set` first."),
                }
            }
            ProfileAction::Set {
                uid,
                name,
                district,
                soil,
                experience,
                crops,
                land_size,
                land_unit,
                irrigation,
                phone,
            } => {
                let store = ProfileStore::new(&cfg.profile);
                let created_at = store
                    .load()?
                    .filter(|existing| existing.uid == uid)
                    .map(|existing| existing.created_at)
                    .unwrap_or_else(Utc::now);
                let profile = FarmerProfile {
                    uid,
                    full_name: name,
                    district,
                    soil_type: parse_soil(&soil)?,
                    years_farming: experience,
                    crops_grown: crops,
                    land_size,
                    land_unit: parse_land_unit(&land_unit)?,
                    irrigation_type: parse_irrigation(&irrigation)?,
                    phone_number: phone,
                    created_at,
                    updated_at: Utc::now(),
                };
                let client = AdvisoryClient::new(&cfg.api)?;
                let written = store.update_with_sync(profile, Some(&client)).await?;
                println!("Profile saved for {}.", written.full_name);
            }
        },
        Commands::Health => {
            let client = AdvisoryClient::new(&cfg.api)?;
            match client.health().await {
                Ok(health) => println!("Advisory service: {}", health.status),
                Err(err) => bail!("health check failed: {err}"),
            }
        }
        Commands::Serve { service } => match service {
            ServeService::Speech => {
                server::run_server(&cfg).await?;
            }
        },
    }

    Ok(())
}

fn open_session(cfg: &config::Config) -> Result<AdvisorSession<AdvisoryClient>> {
    let store = ProfileStore::new(&cfg.profile);
    let profile = store
        .load()?
        .context("No profile found. Run `saarthi profile set` first.")?;
    let client = AdvisoryClient::new(&cfg.api)?;
    Ok(AdvisorSession::new(client, profile, cfg.image.clone()))
}

fn parse_soil(value: &str) -> Result<SoilType> {
    match value.to_lowercase().as_str() {
        "red" => Ok(SoilType::Red),
        "black" => Ok(SoilType::Black),
        "loamy" => Ok(SoilType::Loamy),
        "laterite" => Ok(SoilType::Laterite),
        "sandy" => Ok(SoilType::Sandy),
        other => bail!("unknown soil type: {other} (expected Red, Black, Loamy, Laterite, or Sandy)"),
    }
}

fn parse_land_unit(value: &str) -> Result<LandUnit> {
    match value.to_lowercase().as_str() {
        "acres" => Ok(LandUnit::Acres),
        "hectares" => Ok(LandUnit::Hectares),
        other => bail!("unknown land unit: {other} (expected acres or hectares)"),
    }
}

fn parse_irrigation(value: &str) -> Result<IrrigationType> {
    match value.to_lowercase().as_str() {
        "borewell" => Ok(IrrigationType::Borewell),
        "canal" => Ok(IrrigationType::Canal),
        "rain-fed" | "rainfed" => Ok(IrrigationType::RainFed),
        "drip" => Ok(IrrigationType::Drip),
        other => bail!("unknown irrigation type: {other} (expected Borewell, Canal, Rain-fed, or Drip)"),
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

fn print_advice(advice: &[AdviceItem]) {
    if advice.is_empty() {
        println!("No advice returned.");
        return;
    }
    for (i, item) in advice.iter().enumerate() {
        println!("{}. {} [{}]", i + 1, item.title, priority_label(item.priority));
        if item.summary.is_empty() {
            println!("   (no summary available)");
        } else {
            println!("   {}", item.summary);
        }
        if item.localized_text != item.summary && !item.localized_text.is_empty() {
            println!("   {}", item.localized_text);
        }
        if let Some(url) = &item.audio_url {
            println!("   audio: {url}");
        }
        if let Some(contextual) = &item.contextual {
            for alert in &contextual.weather_alerts {
                println!("   ! {alert}");
            }
            for tip in &contextual.crop_care {
                println!("   - {tip}");
            }
        }
    }
}

fn print_dashboard(dashboard: &krishi_saarthi::advisor::Dashboard) {
    if dashboard.provenance == Provenance::Fallback {
        println!("(advisory service unreachable - showing built-in substitute data)\n");
    }

    println!("WEATHER");
    for day in &dashboard.weather {
        println!(
            "  {}  {:<14} {:>2.0}-{:.0}°C  rain {:>4.1}mm  {}",
            day.date,
            day.description,
            day.temperature.min,
            day.temperature.max,
            day.rainfall,
            day.action_tip
        );
    }

    println!("\nMARKET");
    for quote in &dashboard.market {
        println!(
            "  {:<14} ₹{}/quintal  {}  {}",
            quote.crop_name,
            quote.current_price,
            match quote.recommendation {
                krishi_saarthi::models::MarketAction::Sell => "SELL",
                krishi_saarthi::models::MarketAction::Hold => "HOLD",
            },
            quote.explanation
        );
    }

    println!("\nSCHEMES");
    for scheme in &dashboard.schemes {
        println!("  {:<36} {}", scheme.name, scheme.benefit);
    }

    if let Some(plan) = &dashboard.daily_plan {
        println!("\nTODAY");
        println!("  {}", plan.summary);
    }
}

fn print_profile(profile: &FarmerProfile) {
    println!("{} ({})", profile.full_name, profile.uid);
    println!("  district:   {}", profile.district);
    println!("  soil:       {:?}", profile.soil_type);
    println!("  experience: {} years", profile.years_farming);
    println!("  crops:      {}", profile.crops_grown.join(", "));
    println!(
        "  land:       {} {:?}",
        profile.land_size, profile.land_unit
    );
    println!("  irrigation: {:?}", profile.irrigation_type);
    if let Some(phone) = &profile.phone_number {
        println!("  phone:      {phone}");
    }
}
