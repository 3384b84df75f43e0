//! Recording of dispatched gestures for later inspection.

use crate::core::events::{GestureEvent, GestureKind, Payload};
use crate::dispatch::DispatchOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One actionable event and what was done with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    pub kind: GestureKind,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Action performed (or attempted), in mapping-file form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// A recorded session as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub events: Vec<EventRecord>,
}

/// Collects event records for one session.
#[derive(Debug)]
pub struct SessionRecorder {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    events: Vec<EventRecord>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            events: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Record an event. Non-actionable events are skipped.
    pub fn record(&mut self, event: &GestureEvent, outcome: &DispatchOutcome) {
        if !event.kind.is_actionable() {
            return;
        }
        self.events.push(EventRecord {
            at: Utc::now(),
            kind: event.kind,
            payload: event.payload,
            profile: outcome.profile().map(str::to_string),
            action: outcome.action().map(ToString::to_string),
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn finish(self) -> SessionExport {
        SessionExport {
            session_id: self.session_id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            events: self.events,
        }
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionExport {
    /// Write to `dir/session_<timestamp>.json`, returning the path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, std::io::Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "session_{}.json",
            self.started_at.format("%Y%m%d_%H%M%S")
        ));
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::ScreenPoint;
    use crate::dispatch::Action;

    #[test]
    fn test_recorder_skips_non_actionable() {
        let mut recorder = SessionRecorder::new();
        recorder.record(&GestureEvent::NONE, &DispatchOutcome::Ignored);
        recorder.record(
            &GestureEvent::new(GestureKind::ScrollModeEngaged),
            &DispatchOutcome::Ignored,
        );
        assert!(recorder.is_empty());

        recorder.record(
            &GestureEvent::at(GestureKind::MouseMove, ScreenPoint::new(1, 2)),
            &DispatchOutcome::Performed {
                profile: "default".to_string(),
                action: Action::MouseMove,
            },
        );
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_export_written_to_directory() {
        let dir = std::env::temp_dir().join(format!("handbridge-record-{}", std::process::id()));
        let mut recorder = SessionRecorder::new();
        recorder.record(
            &GestureEvent::new(GestureKind::SwipeLeft),
            &DispatchOutcome::Suppressed,
        );
        let export = recorder.finish();
        let path = export.write_to(&dir).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: SessionExport = serde_json::from_str(&content).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(parsed.session_id, export.session_id);
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.events[0].kind, GestureKind::SwipeLeft);
        assert_eq!(parsed.events[0].action, None);
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("session_")));
    }
}
