//! Session statistics for the recognition pipeline.
//!
//! Counters are shared between the frame loop, the dispatcher and the
//! optional HTTP server, and accumulate across runs when persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Pipeline counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    /// Frames that reached the recognizer
    frames_processed: AtomicU64,
    /// Frames without a usable hand
    hand_absent: AtomicU64,
    /// Frames evicted before the recognizer saw them
    frames_dropped: AtomicU64,
    /// Actionable events emitted by the recognizer
    events_recognized: AtomicU64,
    /// Actions handed to the input sink successfully
    actions_performed: AtomicU64,
    /// Major events swallowed by the dispatch cooldown
    actions_suppressed: AtomicU64,
    /// Actions the input sink rejected
    dispatch_failures: AtomicU64,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            frames_processed: AtomicU64::new(0),
            hand_absent: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            events_recognized: AtomicU64::new(0),
            actions_performed: AtomicU64::new(0),
            actions_suppressed: AtomicU64::new(0),
            dispatch_failures: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create stats that load from and save to `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            warn!("Could not load previous session stats: {e}");
        }

        stats
    }

    /// Record one recognizer tick.
    pub fn record_frame(&self, hand_present: bool) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
        if !hand_present {
            self.hand_absent.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_frames_dropped(&self, count: u64) {
        self.frames_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_event(&self) {
        self.events_recognized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_action_performed(&self) {
        self.actions_performed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_action_suppressed(&self) {
        self.actions_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            hand_absent: self.hand_absent.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            events_recognized: self.events_recognized.load(Ordering::Relaxed),
            actions_performed: self.actions_performed.load(Ordering::Relaxed),
            actions_suppressed: self.actions_suppressed.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Frames processed: {}\n\
             - Frames without a hand: {}\n\
             - Frames dropped: {}\n\
             - Gestures recognized: {}\n\
             - Actions performed: {}\n\
             - Actions suppressed by cooldown: {}\n\
             - Dispatch failures: {}\n\
             - Session duration: {} seconds",
            s.frames_processed,
            s.hand_absent,
            s.frames_dropped,
            s.events_recognized,
            s.actions_performed,
            s.actions_suppressed,
            s.dispatch_failures,
            s.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let s = self.snapshot();
            let persisted = PersistedStats {
                frames_processed: s.frames_processed,
                hand_absent: s.hand_absent,
                frames_dropped: s.frames_dropped,
                events_recognized: s.events_recognized,
                actions_performed: s.actions_performed,
                actions_suppressed: s.actions_suppressed,
                dispatch_failures: s.dispatch_failures,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let p: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.frames_processed
                    .store(p.frames_processed, Ordering::Relaxed);
                self.hand_absent.store(p.hand_absent, Ordering::Relaxed);
                self.frames_dropped.store(p.frames_dropped, Ordering::Relaxed);
                self.events_recognized
                    .store(p.events_recognized, Ordering::Relaxed);
                self.actions_performed
                    .store(p.actions_performed, Ordering::Relaxed);
                self.actions_suppressed
                    .store(p.actions_suppressed, Ordering::Relaxed);
                self.dispatch_failures
                    .store(p.dispatch_failures, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.frames_processed,
            &self.hand_absent,
            &self.frames_dropped,
            &self.events_recognized,
            &self.actions_performed,
            &self.actions_suppressed,
            &self.dispatch_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_processed: u64,
    pub hand_absent: u64,
    pub frames_dropped: u64,
    pub events_recognized: u64,
    pub actions_performed: u64,
    pub actions_suppressed: u64,
    pub dispatch_failures: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    #[serde(default)]
    frames_processed: u64,
    #[serde(default)]
    hand_absent: u64,
    #[serde(default)]
    frames_dropped: u64,
    #[serde(default)]
    events_recognized: u64,
    #[serde(default)]
    actions_performed: u64,
    #[serde(default)]
    actions_suppressed: u64,
    #[serde(default)]
    dispatch_failures: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared session stats.
pub type SharedSessionStats = Arc<SessionStats>;

pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedSessionStats {
    Arc::new(SessionStats::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let stats = SessionStats::new();

        stats.record_frame(true);
        stats.record_frame(false);
        stats.record_frame(false);
        stats.record_frames_dropped(4);
        stats.record_event();
        stats.record_action_performed();
        stats.record_action_suppressed();

        let s = stats.snapshot();
        assert_eq!(s.frames_processed, 3);
        assert_eq!(s.hand_absent, 2);
        assert_eq!(s.frames_dropped, 4);
        assert_eq!(s.events_recognized, 1);
        assert_eq!(s.actions_performed, 1);
        assert_eq!(s.actions_suppressed, 1);
        assert_eq!(s.dispatch_failures, 0);
    }

    #[test]
    fn test_stats_reset() {
        let stats = SessionStats::new();
        stats.record_frame(false);
        stats.record_dispatch_failure();
        stats.reset();

        let s = stats.snapshot();
        assert_eq!(s.frames_processed, 0);
        assert_eq!(s.hand_absent, 0);
        assert_eq!(s.dispatch_failures, 0);
    }

    #[test]
    fn test_stats_persist_across_runs() {
        let path = std::env::temp_dir().join(format!(
            "handbridge-stats-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let first = SessionStats::with_persistence(path.clone());
        first.record_frame(true);
        first.record_event();
        first.save().unwrap();

        let second = SessionStats::with_persistence(path.clone());
        second.record_frame(true);
        let _ = std::fs::remove_file(&path);

        let s = second.snapshot();
        assert_eq!(s.frames_processed, 2);
        assert_eq!(s.events_recognized, 1);
    }

    #[test]
    fn test_summary_format() {
        let summary = SessionStats::new().summary();
        assert!(summary.contains("Frames processed"));
        assert!(summary.contains("Actions suppressed by cooldown"));
    }
}
