//! Foreground application detection and active profile selection.

use crate::dispatch::profile::DEFAULT_PROFILE;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::info;

/// Reports the executable name of the foreground application.
pub trait AppDetector: Send {
    fn foreground_app(&self) -> Option<String>;
}

/// Detector for platforms without foreground detection.
#[derive(Debug, Default)]
pub struct NoopAppDetector;

impl AppDetector for NoopAppDetector {
    fn foreground_app(&self) -> Option<String> {
        None
    }
}

/// Chooses the profile each event is dispatched under.
pub enum ProfileSelector {
    Fixed(String),
    Auto(AutoSelector),
}

impl ProfileSelector {
    pub fn fixed(profile: &str) -> Self {
        ProfileSelector::Fixed(profile.to_string())
    }

    pub fn auto(
        detector: Box<dyn AppDetector>,
        app_profiles: HashMap<String, String>,
        refresh_interval: Duration,
    ) -> Self {
        let app_profiles = app_profiles
            .into_iter()
            .map(|(app, profile)| (app.to_lowercase(), profile))
            .collect();
        ProfileSelector::Auto(AutoSelector {
            detector,
            app_profiles,
            refresh_interval,
            current: DEFAULT_PROFILE.to_string(),
            last_refresh: None,
        })
    }

    /// Active profile id at `now`, re-detecting the foreground application
    /// when the refresh interval has passed.
    pub fn current(&mut self, now: Instant) -> &str {
        match self {
            ProfileSelector::Fixed(profile) => profile,
            ProfileSelector::Auto(auto) => {
                auto.refresh(now);
                &auto.current
            }
        }
    }
}

pub struct AutoSelector {
    detector: Box<dyn AppDetector>,
    app_profiles: HashMap<String, String>,
    refresh_interval: Duration,
    current: String,
    last_refresh: Option<Instant>,
}

impl AutoSelector {
    fn refresh(&mut self, now: Instant) {
        let due = self
            .last_refresh
            .map_or(true, |at| now.saturating_duration_since(at) >= self.refresh_interval);
        if !due {
            return;
        }
        self.last_refresh = Some(now);

        let app = self.detector.foreground_app();
        let profile = app
            .as_deref()
            .and_then(|name| self.app_profiles.get(&name.to_lowercase()))
            .map(String::as_str)
            .unwrap_or(DEFAULT_PROFILE);

        if profile != self.current {
            info!(
                app = app.as_deref().unwrap_or("unknown"),
                "Switching profile: {} -> {}", self.current, profile
            );
            self.current = profile.to_string();
        }
    }
}
