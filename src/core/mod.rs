//! Core recognition for HandBridge.
//!
//! This module contains:
//! - Landmark frames and the stateless geometry computed from them
//! - Per-frame posture classification
//! - Smoothing filters and bounded motion history
//! - The gesture state machine and its event vocabulary
//! - Synthetic hands for driving the recognizer without a camera

pub mod events;
pub mod filters;
pub mod geometry;
pub mod landmarks;
pub mod posture;
pub mod recognizer;
pub mod synthetic;

// Re-export commonly used types
pub use events::{GestureEvent, GestureKind, Payload, SwipeDirection};
pub use filters::{ExponentialSmoother, MotionHistory, RingBuffer};
pub use geometry::{MappingRegion, ScreenMapper, ScreenPoint};
pub use landmarks::{FrameError, Landmark, LandmarkFrame, LANDMARK_COUNT};
pub use posture::{HandPosture, ScrollVariant, SteadyPosture};
pub use recognizer::{GestureRecognizer, GestureState};
pub use synthetic::{HandPose, SyntheticHand};
