//! Configuration for HandBridge.
//!
//! Thresholds for the recognizer live in [`GestureConfig`]; everything the
//! surrounding application needs (paths, screen, profiles, queueing) lives in
//! [`Config`]. Both are persisted as JSON with durations in milliseconds.

use crate::core::geometry::MappingRegion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Screen size assumed when neither the config nor the input sink knows it.
pub const FALLBACK_SCREEN_SIZE: (u32, u32) = (1920, 1080);

/// Main configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recognizer thresholds
    pub gesture: GestureConfig,

    /// Part of the camera image mapped onto the full screen
    pub mapping_region: MappingRegion,

    /// Screen size override; otherwise asked from the input sink
    pub screen_size: Option<(u32, u32)>,

    /// Keep mapped positions on screen
    pub clamp_to_screen: bool,

    /// Gesture-to-action mapping file; built-in profiles when missing
    pub mappings_path: PathBuf,

    /// Path for storing session statistics
    pub data_path: PathBuf,

    /// Path for recorded sessions
    pub export_path: PathBuf,

    /// Whether recognition is currently paused
    pub paused: bool,

    /// Frames buffered between the landmark source and the recognizer
    pub frame_queue_capacity: usize,

    /// Minimum spacing between two dispatched swipes or posture transitions
    #[serde(with = "duration_serde")]
    pub major_event_cooldown: Duration,

    /// How often the foreground application is re-checked
    #[serde(with = "duration_serde")]
    pub profile_refresh_interval: Duration,

    /// Foreground executable name (lowercase) to profile id
    pub app_profiles: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("handbridge");

        let app_profiles = [
            ("chrome.exe", "browser"),
            ("firefox.exe", "browser"),
            ("msedge.exe", "browser"),
            ("photoshop.exe", "designer"),
            ("figma.exe", "designer"),
        ]
        .into_iter()
        .map(|(app, profile)| (app.to_string(), profile.to_string()))
        .collect();

        Self {
            gesture: GestureConfig::default(),
            mapping_region: MappingRegion::default(),
            screen_size: None,
            clamp_to_screen: true,
            mappings_path: Self::config_dir().join("mappings.json"),
            export_path: data_dir.join("sessions"),
            data_path: data_dir,
            paused: false,
            frame_queue_capacity: 2,
            major_event_cooldown: Duration::from_millis(500),
            profile_refresh_interval: Duration::from_secs(1),
            app_profiles,
        }
    }
}

impl Config {
    /// Load configuration from the default location and validate it.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("handbridge")
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()?;

        if !self.mapping_region.is_valid() {
            return Err(invalid(
                "mapping_region",
                "bounds must be ordered and within [0, 1]",
            ));
        }
        if let Some((w, h)) = self.screen_size {
            if w == 0 || h == 0 {
                return Err(invalid("screen_size", "dimensions must be non-zero"));
            }
        }
        if self.frame_queue_capacity == 0 {
            return Err(invalid("frame_queue_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Profile configured for a foreground executable, matched case-insensitively.
    pub fn profile_for_app(&self, app: &str) -> Option<&str> {
        let wanted = app.to_lowercase();
        self.app_profiles
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, profile)| profile.as_str())
    }
}

/// Tunable thresholds of the gesture recognizer.
///
/// Pinch thresholds are ratios of the hand scale (wrist to middle MCP);
/// positions and velocities are in normalized image units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub pinch_close_ratio: f64,
    pub pinch_open_ratio: f64,

    #[serde(with = "duration_serde")]
    pub drag_confirm_duration: Duration,
    /// Pixels the pinch midpoint may travel before a drag starts early
    pub drag_confirm_movement: f64,
    #[serde(with = "duration_serde")]
    pub double_click_interval: Duration,

    pub scroll_movement_threshold: f64,
    pub scroll_sensitivity: f64,
    #[serde(with = "duration_serde")]
    pub scroll_engage_hold: Duration,

    /// Mean wrist movement per tick needed for a swipe
    pub swipe_velocity_threshold: f64,
    #[serde(with = "duration_serde")]
    pub swipe_cooldown: Duration,
    pub swipe_buffer_len: usize,

    /// Minimum time a fist or open hand must be held before a transition counts
    #[serde(with = "duration_serde")]
    pub posture_transition_time: Duration,
    /// How long a steady posture survives frames that match neither fist nor open
    #[serde(with = "duration_serde")]
    pub posture_grace: Duration,

    pub finger_curl_tolerance: f64,
    pub fist_radius: f64,

    pub mouse_smoothing: f64,
    pub drag_smoothing: f64,

    /// Quiet period after a full reset before a new pinch may start
    #[serde(with = "duration_serde")]
    pub gesture_debounce: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_close_ratio: 0.15,
            pinch_open_ratio: 0.25,
            drag_confirm_duration: Duration::from_millis(250),
            drag_confirm_movement: 40.0,
            double_click_interval: Duration::from_millis(400),
            scroll_movement_threshold: 0.005,
            scroll_sensitivity: 2000.0,
            scroll_engage_hold: Duration::from_millis(300),
            swipe_velocity_threshold: 0.02,
            swipe_cooldown: Duration::from_millis(300),
            swipe_buffer_len: 5,
            posture_transition_time: Duration::from_millis(300),
            posture_grace: Duration::from_millis(250),
            finger_curl_tolerance: 0.01,
            fist_radius: 0.08,
            mouse_smoothing: 0.35,
            drag_smoothing: 0.5,
            gesture_debounce: Duration::from_millis(250),
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("pinch_close_ratio", self.pinch_close_ratio)?;
        positive("pinch_open_ratio", self.pinch_open_ratio)?;
        if self.pinch_close_ratio >= self.pinch_open_ratio {
            return Err(invalid(
                "pinch_close_ratio",
                "must be smaller than pinch_open_ratio",
            ));
        }

        non_negative("drag_confirm_movement", self.drag_confirm_movement)?;
        non_negative("scroll_movement_threshold", self.scroll_movement_threshold)?;
        positive("scroll_sensitivity", self.scroll_sensitivity)?;
        positive("swipe_velocity_threshold", self.swipe_velocity_threshold)?;
        non_negative("finger_curl_tolerance", self.finger_curl_tolerance)?;
        positive("fist_radius", self.fist_radius)?;

        if self.swipe_buffer_len < 2 {
            return Err(invalid("swipe_buffer_len", "must be at least 2"));
        }
        for (name, factor) in [
            ("mouse_smoothing", self.mouse_smoothing),
            ("drag_smoothing", self.drag_smoothing),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(invalid(name, "must be in (0, 1]"));
            }
        }
        if self.double_click_interval.is_zero() {
            return Err(invalid("double_click_interval", "must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive number"))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a non-negative number"))
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid configuration: {field} {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration, as whole milliseconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
