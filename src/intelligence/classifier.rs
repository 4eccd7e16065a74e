// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Classification of raw health-data samples into canonical workout records

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::config::fitness_config::WeightEstimationConfig;
use crate::config::FitnessConfig;
use crate::constants::limits::{METERS_PER_MILE, SECONDS_PER_MINUTE};
use crate::logging::AppLogger;
use crate::models::{ActivityCategory, ModelError, SourceLabel, WorkoutInput, WorkoutRecord};
use crate::providers::RawWorkoutSample;

/// Platform activity type of a raw sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawActivityType {
    Cycling,
    Running,
    Walking,
    Yoga,
    FunctionalStrengthTraining,
    TraditionalStrengthTraining,
    Swimming,
    /// Generic cardio; disambiguated by source
    MixedCardio,
    /// Code without a known mapping
    Unknown(String),
}

impl RawActivityType {
    /// Resolve a raw code using the configured mapping first
    pub fn from_code(code: &str, fitness_config: &FitnessConfig) -> Self {
        if let Some(internal_name) = fitness_config.map_activity_type(code) {
            return Self::from_internal_string(internal_name);
        }

        // Fall back to the built-in names and numeric codes
        match code.trim().to_ascii_lowercase().as_str() {
            "cycling" | "13" => RawActivityType::Cycling,
            "running" | "37" => RawActivityType::Running,
            "walking" | "52" => RawActivityType::Walking,
            "yoga" | "57" => RawActivityType::Yoga,
            "functionalstrengthtraining" | "20" => RawActivityType::FunctionalStrengthTraining,
            "traditionalstrengthtraining" | "50" => RawActivityType::TraditionalStrengthTraining,
            "swimming" | "46" => RawActivityType::Swimming,
            "mixedcardio" | "73" => RawActivityType::MixedCardio,
            _ => RawActivityType::Unknown(code.to_string()),
        }
    }

    /// Create a raw activity type from its internal configuration name
    pub fn from_internal_string(internal_name: &str) -> Self {
        match internal_name {
            "cycling" => RawActivityType::Cycling,
            "running" => RawActivityType::Running,
            "walking" => RawActivityType::Walking,
            "yoga" => RawActivityType::Yoga,
            "functional_strength_training" => RawActivityType::FunctionalStrengthTraining,
            "traditional_strength_training" => RawActivityType::TraditionalStrengthTraining,
            "swimming" => RawActivityType::Swimming,
            "mixed_cardio" => RawActivityType::MixedCardio,
            other => RawActivityType::Unknown(other.to_string()),
        }
    }
}

/// Result of classifying one sample
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub source: SourceLabel,
    pub activity: ActivityCategory,
    /// Lifted weight, only ever set for strength sessions
    pub weight: Option<f64>,
}

/// Policy for the pounds lifted in a strength session
pub trait WeightEstimator: Send + Sync {
    fn estimate(
        &self,
        source: SourceLabel,
        metadata: &HashMap<String, Value>,
        calories: Option<f64>,
    ) -> Option<f64>;
}

/// Explicit metadata value if present, otherwise calories times a per-source multiplier
///
/// The multipliers are a rough approximation that historical data depends on,
/// so they are kept as-is.
#[derive(Debug, Clone)]
pub struct CalorieMultiplierEstimator {
    metadata_keys: Vec<String>,
    tonal_multiplier: f64,
    default_multiplier: f64,
}

impl CalorieMultiplierEstimator {
    pub fn new(config: &WeightEstimationConfig) -> Self {
        Self {
            metadata_keys: config.metadata_keys.clone(),
            tonal_multiplier: config.tonal_calorie_multiplier,
            default_multiplier: config.default_calorie_multiplier,
        }
    }
}

impl Default for CalorieMultiplierEstimator {
    fn default() -> Self {
        Self::new(&WeightEstimationConfig::default())
    }
}

impl WeightEstimator for CalorieMultiplierEstimator {
    fn estimate(
        &self,
        source: SourceLabel,
        metadata: &HashMap<String, Value>,
        calories: Option<f64>,
    ) -> Option<f64> {
        let explicit = self
            .metadata_keys
            .iter()
            .find_map(|key| metadata.get(key).and_then(Value::as_f64));
        if explicit.is_some() {
            return explicit;
        }

        let multiplier = match source {
            SourceLabel::Tonal => self.tonal_multiplier,
            _ => self.default_multiplier,
        };
        calories.map(|cal| cal * multiplier)
    }
}

/// Maps raw samples onto canonical sources, activities and records
pub struct ActivityClassifier {
    fitness_config: FitnessConfig,
    estimator: Box<dyn WeightEstimator>,
}

impl ActivityClassifier {
    /// Create a classifier using the configured weight estimate
    pub fn new(fitness_config: FitnessConfig) -> Self {
        let estimator = CalorieMultiplierEstimator::new(&fitness_config.weight_estimation);
        Self {
            fitness_config,
            estimator: Box::new(estimator),
        }
    }

    /// Create a classifier with a custom weight estimation policy
    pub fn with_estimator(fitness_config: FitnessConfig, estimator: Box<dyn WeightEstimator>) -> Self {
        Self {
            fitness_config,
            estimator,
        }
    }

    /// Canonical source for an app or device name
    ///
    /// Case-insensitive substring match; the first label in priority order wins.
    pub fn determine_source(source_name: &str) -> SourceLabel {
        let lowercased = source_name.to_lowercase();

        if lowercased.contains("peloton") {
            SourceLabel::Peloton
        } else if lowercased.contains("tonal") {
            SourceLabel::Tonal
        } else if lowercased.contains("cannondale") {
            SourceLabel::Cannondale
        } else if lowercased.contains("gym") || lowercased.contains("fitness") {
            SourceLabel::Gym
        } else {
            SourceLabel::Other
        }
    }

    /// Canonical category for a raw activity type recorded by `source`
    pub fn map_activity(raw: &RawActivityType, source: SourceLabel) -> ActivityCategory {
        match raw {
            RawActivityType::Cycling => ActivityCategory::Cycling,
            RawActivityType::Running => ActivityCategory::Running,
            RawActivityType::Walking => ActivityCategory::Walking,
            RawActivityType::Yoga => ActivityCategory::Yoga,
            RawActivityType::FunctionalStrengthTraining
            | RawActivityType::TraditionalStrengthTraining => ActivityCategory::WeightLifting,
            RawActivityType::Swimming => ActivityCategory::Swimming,
            RawActivityType::MixedCardio if source == SourceLabel::Cannondale => {
                ActivityCategory::OutdoorCycling
            }
            RawActivityType::MixedCardio => ActivityCategory::Cycling,
            RawActivityType::Unknown(_) => ActivityCategory::Other,
        }
    }

    pub fn meters_to_miles(meters: f64) -> f64 {
        meters / METERS_PER_MILE
    }

    /// Classify a sample's source name and activity code
    pub fn classify(
        &self,
        source_name: &str,
        raw_activity_code: &str,
        metadata: &HashMap<String, Value>,
        calories: Option<f64>,
    ) -> Classification {
        let source = Self::determine_source(source_name);
        let raw = RawActivityType::from_code(raw_activity_code, &self.fitness_config);
        let activity = Self::map_activity(&raw, source);

        if let RawActivityType::Unknown(code) = &raw {
            AppLogger::log_classification_fallback(source_name, code, source.as_str());
        }

        let weight = if activity.is_strength() {
            self.estimator.estimate(source, metadata, calories)
        } else {
            None
        };

        debug!(
            source.name = %source_name,
            source.label = %source,
            activity.code = %raw_activity_code,
            activity.category = %activity,
            "Classified workout sample"
        );

        Classification {
            source,
            activity,
            weight,
        }
    }

    /// Convert a raw sample into a validated workout record
    pub fn to_record(&self, sample: &RawWorkoutSample) -> Result<WorkoutRecord, ModelError> {
        let classification = self.classify(
            &sample.source_name,
            &sample.activity_type,
            &sample.metadata,
            sample.total_energy_kcal,
        );

        WorkoutRecord::new(WorkoutInput {
            date: sample.start,
            source: classification.source,
            activity: classification.activity,
            minutes: sample.elapsed_seconds() / SECONDS_PER_MINUTE,
            miles: sample.total_distance_meters.map(Self::meters_to_miles),
            weight: classification.weight,
            calories: sample.total_energy_kcal,
        })
    }
}

impl Default for ActivityClassifier {
    fn default() -> Self {
        Self::new(FitnessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn create_sample(source_name: &str, activity_type: &str) -> RawWorkoutSample {
        let start = Utc.with_ymd_and_hms(2025, 1, 20, 6, 0, 0).unwrap();
        RawWorkoutSample {
            start,
            end: start + Duration::minutes(45),
            duration_seconds: None,
            source_name: source_name.to_string(),
            activity_type: activity_type.to_string(),
            total_distance_meters: None,
            total_energy_kcal: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_peloton_cycling() {
        let classifier = ActivityClassifier::default();
        let result = classifier.classify("My Peloton Bike", "cycling", &HashMap::new(), None);

        assert_eq!(result.source, SourceLabel::Peloton);
        assert_eq!(result.activity, ActivityCategory::Cycling);
        assert_eq!(result.weight, None);
    }

    #[test]
    fn test_mixed_cardio_is_source_conditioned() {
        let classifier = ActivityClassifier::default();

        let cannondale = classifier.classify("Cannondale App", "mixedCardio", &HashMap::new(), None);
        assert_eq!(cannondale.source, SourceLabel::Cannondale);
        assert_eq!(cannondale.activity, ActivityCategory::OutdoorCycling);

        let gym = classifier.classify("Other Gym", "mixedCardio", &HashMap::new(), None);
        assert_eq!(gym.source, SourceLabel::Gym);
        assert_eq!(gym.activity, ActivityCategory::Cycling);
    }

    #[test]
    fn test_determine_source_is_case_insensitive() {
        for (name, expected) in [
            ("PELOTON", SourceLabel::Peloton),
            ("peloton digital", SourceLabel::Peloton),
            ("Tonal", SourceLabel::Tonal),
            ("tOnAl trainer", SourceLabel::Tonal),
            ("CANNONDALE", SourceLabel::Cannondale),
            ("Downtown GYM", SourceLabel::Gym),
            ("Planet Fitness", SourceLabel::Gym),
            ("Apple Watch", SourceLabel::Other),
            ("", SourceLabel::Other),
        ] {
            assert_eq!(ActivityClassifier::determine_source(name), expected, "{name}");
            assert_eq!(
                ActivityClassifier::determine_source(&name.to_uppercase()),
                expected,
                "{name} uppercased"
            );
        }
    }

    #[test]
    fn test_determine_source_priority_order() {
        assert_eq!(ActivityClassifier::determine_source("Tonal for Peloton"), SourceLabel::Peloton);
        assert_eq!(ActivityClassifier::determine_source("Cannondale Tonal"), SourceLabel::Tonal);
        assert_eq!(ActivityClassifier::determine_source("Gym Cannondale"), SourceLabel::Cannondale);
    }

    #[test]
    fn test_canonical_labels_classify_to_themselves() {
        for label in [
            SourceLabel::Peloton,
            SourceLabel::Tonal,
            SourceLabel::Cannondale,
            SourceLabel::Gym,
            SourceLabel::Other,
        ] {
            assert_eq!(ActivityClassifier::determine_source(label.as_str()), label);
        }
    }

    #[test]
    fn test_activity_mapping() {
        let classifier = ActivityClassifier::default();
        let map = |code: &str| classifier.classify("Apple Watch", code, &HashMap::new(), None).activity;

        assert_eq!(map("running"), ActivityCategory::Running);
        assert_eq!(map("walking"), ActivityCategory::Walking);
        assert_eq!(map("yoga"), ActivityCategory::Yoga);
        assert_eq!(map("swimming"), ActivityCategory::Swimming);
        assert_eq!(map("functionalStrengthTraining"), ActivityCategory::WeightLifting);
        assert_eq!(map("traditionalStrengthTraining"), ActivityCategory::WeightLifting);
        assert_eq!(map("37"), ActivityCategory::Running);
        assert_eq!(map("rowing"), ActivityCategory::Other);
        assert_eq!(map(""), ActivityCategory::Other);
    }

    #[test]
    fn test_configured_activity_override() {
        let mut config = FitnessConfig::default();
        config.activity_types.insert("hiit".to_string(), "mixed_cardio".to_string());
        let classifier = ActivityClassifier::new(config);

        let result = classifier.classify("Cannondale", "HIIT", &HashMap::new(), None);
        assert_eq!(result.activity, ActivityCategory::OutdoorCycling);
    }

    #[test]
    fn test_weight_from_metadata_takes_priority() {
        let classifier = ActivityClassifier::default();

        let mut metadata = HashMap::new();
        metadata.insert("total_weight".to_string(), json!(8000.0));
        metadata.insert("HKMetadataKeyWeightLifted".to_string(), json!(9500.0));
        let result = classifier.classify("Tonal", "traditionalStrengthTraining", &metadata, Some(300.0));
        assert_eq!(result.weight, Some(9500.0));

        let mut metadata = HashMap::new();
        metadata.insert("total_weight".to_string(), json!(8000));
        let result = classifier.classify("Tonal", "traditionalStrengthTraining", &metadata, Some(300.0));
        assert_eq!(result.weight, Some(8000.0));
    }

    #[test]
    fn test_weight_estimated_from_calories() {
        let classifier = ActivityClassifier::default();

        let tonal = classifier.classify("Tonal", "functionalStrengthTraining", &HashMap::new(), Some(250.0));
        assert_eq!(tonal.weight, Some(2500.0));

        let gym = classifier.classify("Gold's Gym", "functionalStrengthTraining", &HashMap::new(), Some(250.0));
        assert_eq!(gym.weight, Some(5000.0));

        let no_calories = classifier.classify("Tonal", "functionalStrengthTraining", &HashMap::new(), None);
        assert_eq!(no_calories.weight, None);
    }

    #[test]
    fn test_weight_only_for_strength_sessions() {
        let classifier = ActivityClassifier::default();
        let mut metadata = HashMap::new();
        metadata.insert("total_weight".to_string(), json!(8000.0));

        let result = classifier.classify("Peloton", "cycling", &metadata, Some(500.0));
        assert_eq!(result.weight, None);
    }

    #[test]
    fn test_custom_estimator() {
        struct FixedEstimator;

        impl WeightEstimator for FixedEstimator {
            fn estimate(&self, _: SourceLabel, _: &HashMap<String, Value>, _: Option<f64>) -> Option<f64> {
                Some(42.0)
            }
        }

        let classifier = ActivityClassifier::with_estimator(FitnessConfig::default(), Box::new(FixedEstimator));
        let result = classifier.classify("Gym", "traditionalStrengthTraining", &HashMap::new(), None);
        assert_eq!(result.weight, Some(42.0));
    }

    #[test]
    fn test_meters_to_miles() {
        assert_eq!(ActivityClassifier::meters_to_miles(1609.344), 1.0);
        assert!((ActivityClassifier::meters_to_miles(5000.0) - 3.106_855).abs() < 1e-6);
        assert_eq!(ActivityClassifier::meters_to_miles(0.0), 0.0);
    }

    #[test]
    fn test_to_record() {
        let classifier = ActivityClassifier::default();
        let mut sample = create_sample("Peloton Bike+", "cycling");
        sample.total_distance_meters = Some(16_093.44);
        sample.total_energy_kcal = Some(480.0);

        let record = classifier.to_record(&sample).unwrap();
        assert_eq!(record.date(), sample.start);
        assert_eq!(record.source(), SourceLabel::Peloton);
        assert_eq!(record.activity(), ActivityCategory::Cycling);
        assert_eq!(record.minutes(), 45.0);
        assert!((record.miles().unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(record.calories(), Some(480.0));
        assert_eq!(record.weight(), None);
    }

    #[test]
    fn test_to_record_rejects_malformed_sample() {
        let classifier = ActivityClassifier::default();

        let mut sample = create_sample("Peloton", "running");
        sample.total_energy_kcal = Some(-12.0);
        assert!(matches!(
            classifier.to_record(&sample),
            Err(ModelError::MalformedRecord(_))
        ));

        let mut sample = create_sample("Peloton", "running");
        sample.end = sample.start - Duration::minutes(5);
        assert!(classifier.to_record(&sample).is_err());
    }
}
