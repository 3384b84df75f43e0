//! Wire and in-process types for landmark frames.

use crate::core::landmarks::{FrameError, Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One line of a landmark stream.
///
/// `t` is seconds since the start of the stream; `landmarks` is absent or
/// null when no hand was detected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Landmark>>,
}

impl FrameRecord {
    pub fn absent(t: f64) -> Self {
        Self {
            t: Some(t),
            landmarks: None,
        }
    }

    pub fn from_frame(t: f64, frame: &LandmarkFrame) -> Self {
        Self {
            t: Some(t),
            landmarks: Some(frame.points().to_vec()),
        }
    }

    /// Offset of `t` on a stream that started at `base`. `None` when `t` is
    /// missing, negative, not finite, or beyond what the clock can represent.
    pub fn offset_from(&self, base: Instant) -> Option<Duration> {
        let t = self.t.filter(|t| t.is_finite() && *t >= 0.0)?;
        let offset = Duration::try_from_secs_f64(t).ok()?;
        base.checked_add(offset).map(|_| offset)
    }

    /// Validate the landmarks, if any.
    pub fn to_frame(&self) -> Result<Option<LandmarkFrame>, FrameError> {
        self.landmarks
            .as_deref()
            .map(LandmarkFrame::from_slice)
            .transpose()
    }
}

/// A frame as handed to the recognizer, stamped on the monotonic clock.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub captured_at: Instant,
    pub frame: Option<LandmarkFrame>,
}

/// Errors from a landmark source.
#[derive(Debug)]
pub enum SourceError {
    AlreadyRunning,
    /// A replay can only be played once.
    Exhausted,
    Io(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::AlreadyRunning => write!(f, "Source is already running"),
            SourceError::Exhausted => write!(f, "Source has already been played"),
            SourceError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}
