//! Local profile store with best-effort remote sync.
//!
//! The profile is created at first setup and mutated only through
//! [`ProfileStore::update`], which persists locally and then pushes the
//! same record to the remote profile endpoint. The push is non-blocking
//! and best-effort: a failure is logged and never fails the local update,
//! so the farmer can keep working offline.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;

use crate::client::AdvisoryClient;
use crate::config::ProfileConfig;
use crate::models::FarmerProfile;

/// JSON-file-backed store for the single local profile record.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(config: &ProfileConfig) -> Self {
        Self {
            path: config.path.clone(),
        }
    }

    /// Load the stored profile; `None` before first setup.
    pub fn load(&self) -> Result<Option<FarmerProfile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read profile file: {}", self.path.display()))?;
        let profile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse profile file: {}", self.path.display()))?;
        Ok(Some(profile))
    }

    /// Single mutation entry point: validate, stamp `updated_at`, and
    /// write locally. Returns the record as written.
    pub fn update(&self, mut profile: FarmerProfile) -> Result<FarmerProfile> {
        validate(&profile)?;
        profile.updated_at = Utc::now();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&profile)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write profile file: {}", self.path.display()))?;

        Ok(profile)
    }

    /// [`update`](Self::update), then push the record to the remote
    /// profile endpoint. The push is best-effort: a failure is logged and
    /// the locally-written record is still returned.
    pub async fn update_with_sync(
        &self,
        profile: FarmerProfile,
        remote: Option<&AdvisoryClient>,
    ) -> Result<FarmerProfile> {
        let written = self.update(profile)?;
        if let Some(client) = remote {
            match client.upsert_profile(&written).await {
                Ok(_) => tracing::debug!(uid = %written.uid, "profile pushed to remote"),
                Err(err) => {
                    tracing::warn!(uid = %written.uid, error = %err, "remote profile push failed; local copy kept")
                }
            }
        }
        Ok(written)
    }
}

/// Reject records a farmer could not have produced through setup.
pub fn validate(profile: &FarmerProfile) -> Result<()> {
    if profile.uid.trim().is_empty() {
        anyhow::bail!("profile uid must not be empty");
    }
    if profile.full_name.trim().is_empty() {
        anyhow::bail!("profile full name must not be empty");
    }
    if profile.district.trim().is_empty() {
        anyhow::bail!("profile district must not be empty");
    }
    if profile.crops_grown.is_empty() {
        anyhow::bail!("profile must list at least one crop");
    }
    if profile.land_size <= 0.0 {
        anyhow::bail!("profile land size must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IrrigationType, LandUnit, SoilType};

    fn sample() -> FarmerProfile {
        FarmerProfile {
            uid: "u1".to_string(),
            full_name: "Ravi Kumar".to_string(),
            district: "Mysuru".to_string(),
            soil_type: SoilType::Loamy,
            years_farming: 8,
            crops_grown: vec!["Tomato".to_string()],
            land_size: 1.5,
            land_unit: LandUnit::Acres,
            irrigation_type: IrrigationType::Drip,
            phone_number: Some("+919876543210".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::new(&ProfileConfig {
            path: dir.path().join("data").join("profile.json"),
        })
    }

    #[test]
    fn load_before_setup_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().unwrap().is_none());
    }

    #[test]
    fn update_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let written = store.update(sample()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, written);
        assert_eq!(loaded.full_name, "Ravi Kumar");
    }

    #[test]
    fn update_stamps_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut profile = sample();
        profile.updated_at = "2020-01-01T00:00:00Z".parse().unwrap();
        let written = store.update(profile).unwrap();
        assert!(written.updated_at > written.created_at - chrono::Duration::days(1));
        assert!(written.updated_at.timestamp() > 1_600_000_000);
    }

    #[test]
    fn invalid_records_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut no_name = sample();
        no_name.full_name = "  ".to_string();
        assert!(store.update(no_name).is_err());

        let mut no_crops = sample();
        no_crops.crops_grown.clear();
        assert!(store.update(no_crops).is_err());

        let mut bad_land = sample();
        bad_land.land_size = 0.0;
        assert!(store.update(bad_land).is_err());

        assert!(store.load().unwrap().is_none(), "rejected updates must not write");
    }
}
