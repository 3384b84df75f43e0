//! Deterministic synthetic hands.
//!
//! Produces plausible landmark frames for a handful of poses so the
//! recognizer can be driven without a camera (tests, the demo, and
//! `handbridge start --input` fixtures). The hand has a scale of 0.1
//! (wrist to middle MCP) and is upright in image space.

use crate::core::landmarks::{Landmark, LandmarkFrame, LANDMARK_COUNT};

/// Poses the synthetic hand can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPose {
    /// All five fingers extended.
    Open,
    /// All fingers curled with the thumb tucked against the palm.
    Fist,
    /// Index extended, everything else curled.
    Pointing,
    /// Thumb extended, the four long fingers curled.
    ThumbsUp,
    /// Middle finger extended, the rest curled.
    MiddleOnly,
    /// Index and middle extended; matches no gesture.
    Neutral,
    /// Thumb tip touching the bent index tip, other fingers extended.
    PinchClosed,
    /// Same as `PinchClosed` with a clear thumb-index gap.
    PinchReleased,
    /// Open hand with the thumb tip brought to the straight index tip.
    OkSign,
}

// Offsets from the wrist. Image y grows downwards.
const INDEX_MCP: (f64, f64) = (-0.035, -0.095);
const MIDDLE_MCP: (f64, f64) = (0.0, -0.1);
const RING_MCP: (f64, f64) = (0.035, -0.09);
const PINKY_MCP: (f64, f64) = (0.06, -0.085);

// PIP, DIP and TIP relative to the finger's MCP.
const EXTENDED: [(f64, f64); 3] = [(0.0, -0.045), (0.0, -0.075), (0.0, -0.1)];
const CURLED: [(f64, f64); 3] = [(0.0, -0.03), (0.0, -0.01), (0.0, 0.015)];

// Thumb CMC, MCP, IP and TIP relative to the wrist.
const THUMB_TUCKED: [(f64, f64); 4] = [(-0.025, -0.02), (-0.04, -0.04), (-0.035, -0.06), (-0.005, -0.05)];
const THUMB_OUT: [(f64, f64); 4] = [(-0.025, -0.02), (-0.05, -0.04), (-0.07, -0.055), (-0.09, -0.07)];

// Index PIP, DIP and TIP bent towards the thumb.
const INDEX_BENT: [(f64, f64); 3] = [(-0.045, -0.13), (-0.065, -0.125), (-0.075, -0.11)];
const PINCH_THUMB: [(f64, f64); 3] = [(-0.025, -0.02), (-0.05, -0.04), (-0.065, -0.07)];

/// Thumb-index gap of a closed pinch.
pub const PINCH_CLOSED_GAP: f64 = 0.005;
/// Thumb-index gap of a released pinch.
pub const PINCH_RELEASED_GAP: f64 = 0.05;

/// A synthetic hand anchored at a wrist position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticHand {
    wrist: (f64, f64),
}

impl SyntheticHand {
    pub fn at(x: f64, y: f64) -> Self {
        Self { wrist: (x, y) }
    }

    /// The same hand translated in the image plane.
    pub fn moved(&self, dx: f64, dy: f64) -> Self {
        Self::at(self.wrist.0 + dx, self.wrist.1 + dy)
    }

    pub fn wrist(&self) -> (f64, f64) {
        self.wrist
    }

    /// Build the frame for `pose`.
    pub fn pose(&self, pose: HandPose) -> LandmarkFrame {
        LandmarkFrame::from_trusted(self.points(pose))
    }

    /// Raw points for `pose`, in landmark index order.
    pub fn points(&self, pose: HandPose) -> [Landmark; LANDMARK_COUNT] {
        use HandPose::*;

        let (index, middle, ring, pinky) = match pose {
            Open | OkSign | PinchClosed | PinchReleased => (true, true, true, true),
            Fist | ThumbsUp => (false, false, false, false),
            Pointing => (true, false, false, false),
            MiddleOnly => (false, true, false, false),
            Neutral => (true, true, false, false),
        };

        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[0] = self.offset((0.0, 0.0));

        match pose {
            Open | ThumbsUp => self.fill(&mut points, 1, (0.0, 0.0), &THUMB_OUT),
            PinchClosed | PinchReleased => {
                self.fill(&mut points, 1, (0.0, 0.0), &PINCH_THUMB);
                let gap = if pose == PinchClosed {
                    PINCH_CLOSED_GAP
                } else {
                    PINCH_RELEASED_GAP
                };
                let tip = INDEX_BENT[2];
                points[4] = self.offset((tip.0 + gap, tip.1));
            }
            OkSign => {
                self.fill(&mut points, 1, (0.0, 0.0), &THUMB_OUT);
                let tip = (INDEX_MCP.0 + EXTENDED[2].0, INDEX_MCP.1 + EXTENDED[2].1);
                points[4] = self.offset((tip.0 + PINCH_CLOSED_GAP, tip.1));
            }
            _ => self.fill(&mut points, 1, (0.0, 0.0), &THUMB_TUCKED),
        }

        for (mcp_index, mcp, extended) in [
            (5, INDEX_MCP, index),
            (9, MIDDLE_MCP, middle),
            (13, RING_MCP, ring),
            (17, PINKY_MCP, pinky),
        ] {
            points[mcp_index] = self.offset(mcp);
            if mcp_index == 5 && matches!(pose, PinchClosed | PinchReleased) {
                self.fill(&mut points, mcp_index + 1, (0.0, 0.0), &INDEX_BENT);
            } else {
                let joints = if extended { &EXTENDED } else { &CURLED };
                self.fill(&mut points, mcp_index + 1, mcp, joints);
            }
        }

        points
    }

    fn offset(&self, (dx, dy): (f64, f64)) -> Landmark {
        Landmark::new(self.wrist.0 + dx, self.wrist.1 + dy, 0.0)
    }

    fn fill(
        &self,
        points: &mut [Landmark; LANDMARK_COUNT],
        start: usize,
        base: (f64, f64),
        offsets: &[(f64, f64)],
    ) {
        for (i, (dx, dy)) in offsets.iter().enumerate() {
            points[start + i] = self.offset((base.0 + dx, base.1 + dy));
        }
    }
}
