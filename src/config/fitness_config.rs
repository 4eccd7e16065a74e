// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fitness-specific configuration for activity-type codes and weight estimation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::classification::{
    DEFAULT_CALORIE_MULTIPLIER, TONAL_CALORIE_MULTIPLIER, WEIGHT_METADATA_KEYS,
};

/// Main fitness configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessConfig {
    /// Raw activity-type code (lowercase name or numeric code) to internal activity name
    #[serde(default = "default_activity_types")]
    pub activity_types: HashMap<String, String>,
    #[serde(default)]
    pub weight_estimation: WeightEstimationConfig,
}

/// Parameters of the calorie-based lifted-weight estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEstimationConfig {
    /// Metadata keys holding an explicit lifted weight, checked in order
    pub metadata_keys: Vec<String>,
    pub tonal_calorie_multiplier: f64,
    pub default_calorie_multiplier: f64,
}

impl FitnessConfig {
    /// Load fitness configuration from file or use defaults
    pub fn load(path: Option<String>) -> Result<Self> {
        // Try explicit path first
        if let Some(config_path) = path {
            return Self::load_from_file(&config_path);
        }

        if Path::new("fitness_config.toml").exists() {
            return Self::load_from_file("fitness_config.toml");
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fitness config file: {}", path))?;

        let config: FitnessConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse fitness config file: {}", path))?;

        Ok(config)
    }

    /// Get the internal activity name for a raw activity-type code
    pub fn map_activity_type(&self, raw_code: &str) -> Option<&str> {
        let code = raw_code.trim();
        self.activity_types
            .get(code)
            .or_else(|| self.activity_types.get(&code.to_ascii_lowercase()))
            .map(|s| s.as_str())
    }
}

fn default_activity_types() -> HashMap<String, String> {
    let mut activity_types = HashMap::new();

    // Platform activity-type names
    activity_types.insert("cycling".to_string(), "cycling".to_string());
    activity_types.insert("running".to_string(), "running".to_string());
    activity_types.insert("walking".to_string(), "walking".to_string());
    activity_types.insert("yoga".to_string(), "yoga".to_string());
    activity_types.insert("functionalstrengthtraining".to_string(), "functional_strength_training".to_string());
    activity_types.insert("traditionalstrengthtraining".to_string(), "traditional_strength_training".to_string());
    activity_types.insert("swimming".to_string(), "swimming".to_string());
    activity_types.insert("mixedcardio".to_string(), "mixed_cardio".to_string());

    // Platform numeric codes
    activity_types.insert("13".to_string(), "cycling".to_string());
    activity_types.insert("37".to_string(), "running".to_string());
    activity_types.insert("52".to_string(), "walking".to_string());
    activity_types.insert("57".to_string(), "yoga".to_string());
    activity_types.insert("20".to_string(), "functional_strength_training".to_string());
    activity_types.insert("50".to_string(), "traditional_strength_training".to_string());
    activity_types.insert("46".to_string(), "swimming".to_string());
    activity_types.insert("73".to_string(), "mixed_cardio".to_string());

    activity_types
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            activity_types: default_activity_types(),
            weight_estimation: WeightEstimationConfig::default(),
        }
    }
}

impl Default for WeightEstimationConfig {
    fn default() -> Self {
        Self {
            metadata_keys: WEIGHT_METADATA_KEYS.iter().map(|k| k.to_string()).collect(),
            tonal_calorie_multiplier: TONAL_CALORIE_MULTIPLIER,
            default_calorie_multiplier: DEFAULT_CALORIE_MULTIPLIER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_fitness_config() {
        let config = FitnessConfig::default();

        assert_eq!(config.map_activity_type("cycling"), Some("cycling"));
        assert_eq!(config.map_activity_type("mixedCardio"), Some("mixed_cardio"));
        assert_eq!(config.map_activity_type("50"), Some("traditional_strength_training"));
        assert_eq!(config.map_activity_type("rowing"), None);
    }

    #[test]
    fn test_weight_estimation_defaults() {
        let config = FitnessConfig::default();
        let estimation = &config.weight_estimation;

        assert_eq!(estimation.metadata_keys, vec!["HKMetadataKeyWeightLifted", "total_weight"]);
        assert_eq!(estimation.tonal_calorie_multiplier, 10.0);
        assert_eq!(estimation.default_calorie_multiplier, 20.0);
    }

    #[test]
    fn test_config_file_loading() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, r#"
[activity_types]
"rowing" = "other"
"cycling" = "cycling"

[weight_estimation]
metadata_keys = ["total_weight"]
tonal_calorie_multiplier = 12.0
default_calorie_multiplier = 18.0
        "#)?;

        let config = FitnessConfig::load_from_file(temp_file.path().to_str().unwrap())?;

        assert_eq!(config.map_activity_type("Rowing"), Some("other"));
        assert_eq!(config.map_activity_type("running"), None);
        assert_eq!(config.weight_estimation.metadata_keys, vec!["total_weight"]);
        assert_eq!(config.weight_estimation.tonal_calorie_multiplier, 12.0);

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[weight_estimation]\nmetadata_keys = []\ntonal_calorie_multiplier = 10.0\ndefault_calorie_multiplier = 20.0")?;

        let config = FitnessConfig::load_from_file(temp_file.path().to_str().unwrap())?;
        assert_eq!(config.map_activity_type("yoga"), Some("yoga"));

        Ok(())
    }
}
