use super::models::OrderBy;
use crate::args::Args;
use crate::usgs;
use anyhow::Result;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "quakewatch";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub min_magnitude: String,
    pub order_by: OrderBy,
    pub entry_count: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_magnitude: "2.5".to_string(),
            order_by: OrderBy::Time,
            entry_count: "50".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        confy::load(APP_NAME, None).unwrap_or_default()
    }

    /// Loads the stored settings and applies any command-line
    /// overrides. Overrides are persisted, same as editing them in the
    /// settings view.
    pub fn load_with_overrides(args: &Args) -> Result<Self> {
        let mut config = Self::load();
        let mut changed = false;

        if let Some(min_magnitude) = &args.min_magnitude {
            config.min_magnitude = min_magnitude.clone();
            changed = true;
        }
        if let Some(order_by) = &args.order_by {
            config.order_by = order_by.parse().map_err(anyhow::Error::msg)?;
            changed = true;
        }
        if let Some(limit) = &args.limit {
            config.entry_count = limit.clone();
            changed = true;
        }

        if changed {
            config.save();
        }
        Ok(config)
    }

    pub fn save(&self) {
        let _ = confy::store(APP_NAME, None, self.clone());
    }

    pub fn build_url(&self) -> String {
        usgs::build_url(&self.min_magnitude, self.order_by.as_str(), &self.entry_count)
    }
}
