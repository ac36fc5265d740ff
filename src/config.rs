use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::game::constants::{brain, candidate, navigation, probes, rotation, scoring, turret};

/// Configuration loading/validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("candidates.count must be 1-{max} (got {0})", max = candidate::MAX_COUNT)]
    CountOutOfRange(usize),
    #[error("min_distance ({min}) must be less than max_distance ({max})")]
    InvalidDistanceRange { min: f32, max: f32 },
    #[error("Unknown scoring policy '{0}' (expected 'binary' or 'weighted')")]
    UnknownPolicy(String),
}

/// Candidate scoring strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// +1 per satisfied tactical criterion (0-6)
    Binary,
    /// Distance-to-ideal weighting plus a line-of-sight bonus (1-100)
    #[default]
    Weighted,
}

impl FromStr for ScoringPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(ScoringPolicy::Binary),
            "weighted" => Ok(ScoringPolicy::Weighted),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Candidate ring generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub ring_radius: f32,
    pub count: usize,
    pub ground_probe_height: f32,
    pub ground_probe_range: f32,
    pub wall_clearance: f32,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            ring_radius: candidate::RING_RADIUS,
            count: candidate::COUNT,
            ground_probe_height: candidate::GROUND_PROBE_HEIGHT,
            ground_probe_range: candidate::GROUND_PROBE_RANGE,
            wall_clearance: candidate::WALL_CLEARANCE,
        }
    }
}

/// Candidate scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub policy: ScoringPolicy,
    pub min_distance: f32,
    pub max_distance: f32,
    pub hostile_exclusion_radius: f32,
    /// Half-angle of the forward cone
    pub forward_cone_degrees: f32,
}

impl ScoringConfig {
    /// Midpoint of the acceptable distance band
    pub fn ideal_distance(&self) -> f32 {
        (self.min_distance + self.max_distance) * 0.5
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            policy: ScoringPolicy::default(),
            min_distance: scoring::MIN_DISTANCE,
            max_distance: scoring::MAX_DISTANCE,
            hostile_exclusion_radius: scoring::HOSTILE_EXCLUSION_RADIUS,
            forward_cone_degrees: scoring::FORWARD_CONE_DEGREES,
        }
    }
}

/// Obstacle probe fan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub near_distance: f32,
    pub far_distance: f32,
    pub inner_angle: f32,
    pub outer_angle: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            near_distance: probes::NEAR_DISTANCE,
            far_distance: probes::FAR_DISTANCE,
            inner_angle: probes::INNER_ANGLE,
            outer_angle: probes::OUTER_ANGLE,
        }
    }
}

/// Yaw rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Degrees per second
    pub angular_speed: f32,
    pub epsilon: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            angular_speed: rotation::ANGULAR_SPEED,
            epsilon: rotation::EPSILON,
        }
    }
}

/// Forward motion and avoidance turns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub move_speed: f32,
    pub avoid_turn: f32,
    pub blocked_turn: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            move_speed: navigation::MOVE_SPEED,
            avoid_turn: navigation::AVOID_TURN,
            blocked_turn: navigation::BLOCKED_TURN,
        }
    }
}

/// Turret scanning, tracking and targeting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    pub scan_angle: f32,
    pub scan_speed: f32,
    pub track_speed: f32,
    pub fire_alignment: f32,
    /// `None` disables the range check
    pub detection_range: Option<f32>,
    /// `None` disables the field-of-view check
    pub detection_angle: Option<f32>,
    /// `None` disables the ally sphere cast
    pub friendly_radius: Option<f32>,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            scan_angle: turret::SCAN_ANGLE,
            scan_speed: turret::SCAN_SPEED,
            track_speed: turret::TRACK_SPEED,
            fire_alignment: turret::FIRE_ALIGNMENT,
            detection_range: Some(turret::DETECTION_RANGE),
            detection_angle: Some(turret::DETECTION_ANGLE),
            friendly_radius: Some(turret::FRIENDLY_RADIUS),
        }
    }
}

/// Enemy tactical brain timers and thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub refresh_interval: f32,
    pub search_duration: f32,
    pub peek_duration: f32,
    pub arrival_radius: f32,
    pub sight_range: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            refresh_interval: brain::REFRESH_INTERVAL,
            search_duration: brain::SEARCH_DURATION,
            peek_duration: brain::PEEK_DURATION,
            arrival_radius: brain::ARRIVAL_RADIUS,
            sight_range: brain::SIGHT_RANGE,
        }
    }
}

/// Every AI tunable, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    pub candidates: CandidateConfig,
    pub scoring: ScoringConfig,
    pub probes: ProbeConfig,
    pub rotation: RotationConfig,
    pub navigation: NavigationConfig,
    pub turret: TurretConfig,
    pub brain: BrainConfig,
}

impl TacticsConfig {
    /// Parse a JSON config; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load config from TACTICS_CONFIG and environment overrides, or use defaults
    pub fn load_or_default() -> Self {
        let mut config = match std::env::var("TACTICS_CONFIG") {
            Ok(path) => match Self::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring TACTICS_CONFIG: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        config
    }

    /// Apply scalar env overrides, ignoring values that do not parse
    pub fn apply_env_overrides(&mut self) {
        if let Ok(count) = std::env::var("CANDIDATE_COUNT") {
            match count.parse::<usize>() {
                Ok(parsed) if (1..=candidate::MAX_COUNT).contains(&parsed) => self.candidates.count = parsed,
                _ => tracing::warn!(
                    "CANDIDATE_COUNT must be 1-{}, got '{}', ignoring",
                    candidate::MAX_COUNT,
                    count
                ),
            }
        }

        if let Ok(radius) = std::env::var("CANDIDATE_RADIUS") {
            match radius.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 => self.candidates.ring_radius = parsed,
                _ => tracing::warn!("Ignoring invalid CANDIDATE_RADIUS '{}'", radius),
            }
        }

        if let Ok(policy) = std::env::var("SCORING_POLICY") {
            match policy.parse::<ScoringPolicy>() {
                Ok(parsed) => self.scoring.policy = parsed,
                Err(e) => tracing::warn!("Ignoring SCORING_POLICY: {}", e),
            }
        }

        if let Ok(speed) = std::env::var("ANGULAR_SPEED") {
            match speed.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 => self.rotation.angular_speed = parsed,
                _ => tracing::warn!("Ignoring invalid ANGULAR_SPEED '{}'", speed),
            }
        }

        if let Ok(speed) = std::env::var("MOVE_SPEED") {
            match speed.parse::<f32>() {
                Ok(parsed) if parsed >= 0.0 => self.navigation.move_speed = parsed,
                _ => tracing::warn!("Ignoring invalid MOVE_SPEED '{}'", speed),
            }
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("candidates.ring_radius", self.candidates.ring_radius),
            ("candidates.ground_probe_range", self.candidates.ground_probe_range),
            ("scoring.max_distance", self.scoring.max_distance),
            ("probes.near_distance", self.probes.near_distance),
            ("probes.far_distance", self.probes.far_distance),
            ("rotation.angular_speed", self.rotation.angular_speed),
            ("rotation.epsilon", self.rotation.epsilon),
            ("turret.scan_speed", self.turret.scan_speed),
            ("turret.track_speed", self.turret.track_speed),
            ("turret.scan_angle", self.turret.scan_angle),
            ("turret.fire_alignment", self.turret.fire_alignment),
            ("brain.sight_range", self.brain.sight_range),
            ("brain.refresh_interval", self.brain.refresh_interval),
            ("brain.arrival_radius", self.brain.arrival_radius),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(1..=candidate::MAX_COUNT).contains(&self.candidates.count) {
            return Err(ConfigError::CountOutOfRange(self.candidates.count));
        }
        if self.scoring.min_distance < 0.0 || self.scoring.min_distance >= self.scoring.max_distance {
            return Err(ConfigError::InvalidDistanceRange {
                min: self.scoring.min_distance,
                max: self.scoring.max_distance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TacticsConfig::default();
        assert_eq!(config.candidates.count, 12);
        assert_eq!(config.scoring.policy, ScoringPolicy::Weighted);
        assert_eq!(config.rotation.angular_speed, 120.0);
        assert_eq!(config.scoring.ideal_distance(), 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default() {
        let config = TacticsConfig::load_or_default();
        assert!(config.candidates.count > 0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TacticsConfig::from_json(
            r#"{ "scoring": { "policy": "binary", "max_distance": 20.0 }, "rotation": { "angular_speed": 90.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.scoring.policy, ScoringPolicy::Binary);
        assert_eq!(config.scoring.max_distance, 20.0);
        assert_eq!(config.scoring.min_distance, 5.0);
        assert_eq!(config.rotation.angular_speed, 90.0);
        assert_eq!(config.candidates, CandidateConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TacticsConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TacticsConfig::from_file("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TacticsConfig::default();
        config.rotation.angular_speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "rotation.angular_speed", .. })
        ));

        let mut config = TacticsConfig::default();
        config.scoring.min_distance = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDistanceRange { .. })
        ));

        let mut config = TacticsConfig::default();
        config.candidates.count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::CountOutOfRange(0))));
    }

    #[test]
    fn test_validate_covers_turret_and_sight() {
        let cases: [(&str, fn(&mut TacticsConfig)); 3] = [
            ("turret.scan_angle", |c| c.turret.scan_angle = 0.0),
            ("turret.fire_alignment", |c| c.turret.fire_alignment = -1.0),
            ("brain.sight_range", |c| c.brain.sight_range = f32::NAN),
        ];
        for (expected, breaks) in cases {
            let mut config = TacticsConfig::default();
            breaks(&mut config);
            match config.validate() {
                Err(ConfigError::NonPositive { field, .. }) => assert_eq!(field, expected),
                other => panic!("{} should be rejected, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_candidate_count_bounded_from_json() {
        let config = TacticsConfig::from_json(r#"{ "candidates": { "count": 1000000 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::CountOutOfRange(1_000_000))));

        let config = TacticsConfig::from_json(r#"{ "candidates": { "count": 360 } }"#).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Binary".parse::<ScoringPolicy>().unwrap(), ScoringPolicy::Binary);
        assert_eq!(" weighted ".parse::<ScoringPolicy>().unwrap(), ScoringPolicy::Weighted);
        assert!("fuzzy".parse::<ScoringPolicy>().is_err());
    }
}
