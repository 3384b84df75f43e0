//! Per-frame hand posture classification.

use crate::core::geometry::{is_fist, is_fully_open, long_finger_extended, thumb_extended};
use crate::core::landmarks::{Finger, LandmarkFrame};
use serde::{Deserialize, Serialize};

/// Shape of the hand in one frame. Derived fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandPosture {
    pub index_extended: bool,
    pub middle_extended: bool,
    pub ring_extended: bool,
    pub pinky_extended: bool,
    pub thumb_extended: bool,
    pub is_fist: bool,
    pub is_open_hand: bool,
}

/// Postures that hold a steady state and take part in fist/open transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteadyPosture {
    Fist,
    Open,
}

/// The two ways of engaging scroll mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollVariant {
    /// Only the middle finger extended; scrolls with the middle fingertip.
    MiddleFinger,
    /// Thumb up, other fingers curled; scrolls with the wrist.
    ThumbsUp,
}

impl HandPosture {
    pub fn classify(frame: &LandmarkFrame, curl_tolerance: f64, fist_radius: f64) -> Self {
        Self {
            index_extended: long_finger_extended(frame, Finger::Index, curl_tolerance),
            middle_extended: long_finger_extended(frame, Finger::Middle, curl_tolerance),
            ring_extended: long_finger_extended(frame, Finger::Ring, curl_tolerance),
            pinky_extended: long_finger_extended(frame, Finger::Pinky, curl_tolerance),
            thumb_extended: thumb_extended(frame, curl_tolerance),
            is_fist: is_fist(frame, fist_radius),
            is_open_hand: is_fully_open(frame),
        }
    }

    /// Index extended, everything else (thumb included) curled.
    pub fn is_pointing(&self) -> bool {
        self.index_extended
            && !self.middle_extended
            && !self.ring_extended
            && !self.pinky_extended
            && !self.thumb_extended
    }

    pub fn is_thumbs_up(&self) -> bool {
        self.thumb_extended && !self.any_long_finger_extended() && !self.is_fist
    }

    pub fn is_middle_only(&self) -> bool {
        self.middle_extended && !self.index_extended && !self.ring_extended && !self.pinky_extended
    }

    pub fn scroll_variant(&self) -> Option<ScrollVariant> {
        if self.is_middle_only() {
            Some(ScrollVariant::MiddleFinger)
        } else if self.is_thumbs_up() {
            Some(ScrollVariant::ThumbsUp)
        } else {
            None
        }
    }

    /// Fist wins over open; an open hand with a closed pinch is not open.
    pub fn steady(&self, pinch_closed: bool) -> Option<SteadyPosture> {
        if self.is_fist {
            Some(SteadyPosture::Fist)
        } else if self.is_open_hand && !pinch_closed {
            Some(SteadyPosture::Open)
        } else {
            None
        }
    }

    fn any_long_finger_extended(&self) -> bool {
        self.index_extended || self.middle_extended || self.ring_extended || self.pinky_extended
    }
}
