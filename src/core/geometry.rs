//! Stateless geometry over a single landmark frame.
//!
//! Everything here is a pure function of the current frame (plus thresholds);
//! cross-frame memory lives in the recognizer.

use crate::core::landmarks::{
    Finger, Landmark, LandmarkFrame, INDEX_TIP, MIDDLE_MCP, THUMB_IP, THUMB_TIP, WRIST,
};
use serde::{Deserialize, Serialize};

/// Hand scale below which pinch and posture readings are unreliable.
pub const MIN_HAND_SCALE: f64 = 1e-4;

/// Euclidean distance including depth.
pub fn distance3d(a: &Landmark, b: &Landmark) -> f64 {
    let (dx, dy, dz) = (a.x - b.x, a.y - b.y, a.z - b.z);
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Euclidean distance in the image plane.
pub fn distance2d(a: &Landmark, b: &Landmark) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// A finger is extended when its tip sits above its DIP, and the DIP above
/// the PIP, each by more than `tolerance` (image y grows downwards).
pub fn finger_extended(tip: &Landmark, dip: &Landmark, pip: &Landmark, tolerance: f64) -> bool {
    tip.y < dip.y - tolerance && dip.y < pip.y - tolerance
}

/// Extension check for one of the four long fingers of a frame.
pub fn long_finger_extended(frame: &LandmarkFrame, finger: Finger, tolerance: f64) -> bool {
    finger_extended(
        frame.point(finger.tip()),
        frame.point(finger.dip()),
        frame.point(finger.pip()),
        tolerance,
    )
}

/// Thumb is extended when its tip lies farther from the wrist than its IP
/// joint does. Works for any hand rotation.
pub fn thumb_extended(frame: &LandmarkFrame, tolerance: f64) -> bool {
    let wrist = frame.wrist();
    distance2d(wrist, frame.point(THUMB_TIP)) > distance2d(wrist, frame.point(THUMB_IP)) + tolerance
}

/// All five fingertips within `radius` of the palm centre (middle MCP).
pub fn is_fist(frame: &LandmarkFrame, radius: f64) -> bool {
    let palm = frame.point(MIDDLE_MCP);
    std::iter::once(THUMB_TIP)
        .chain(Finger::ALL.iter().map(|f| f.tip()))
        .all(|tip| distance2d(frame.point(tip), palm) < radius)
}

/// Every long finger reaches farther from the wrist at its tip than at its PIP.
pub fn is_fully_open(frame: &LandmarkFrame) -> bool {
    let wrist = frame.wrist();
    Finger::ALL.iter().all(|f| {
        distance2d(wrist, frame.point(f.tip())) > distance2d(wrist, frame.point(f.pip()))
    })
}

/// Planar thumb-tip to index-tip distance.
pub fn pinch_distance_2d(frame: &LandmarkFrame) -> f64 {
    distance2d(frame.point(THUMB_TIP), frame.point(INDEX_TIP))
}

/// Reference length used to normalise pinch thresholds (wrist to middle MCP).
pub fn hand_scale(frame: &LandmarkFrame) -> f64 {
    distance2d(frame.point(WRIST), frame.point(MIDDLE_MCP))
}

/// Normalized midpoint between thumb tip and index tip.
pub fn pinch_midpoint(frame: &LandmarkFrame) -> (f64, f64) {
    let (thumb, index) = (frame.point(THUMB_TIP), frame.point(INDEX_TIP));
    ((thumb.x + index.x) / 2.0, (thumb.y + index.y) / 2.0)
}

/// Planar wrist movement from `previous` to `current`.
pub fn wrist_delta(previous: &LandmarkFrame, current: &LandmarkFrame) -> (f64, f64) {
    let (a, b) = (previous.wrist(), current.wrist());
    (b.x - a.x, b.y - a.y)
}

/// A position on screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &ScreenPoint) -> f64 {
        f64::from(self.x - other.x).hypot(f64::from(self.y - other.y))
    }
}

/// Normalized sub-rectangle of the camera image that spans the whole screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappingRegion {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for MappingRegion {
    fn default() -> Self {
        Self {
            x_min: 0.2,
            x_max: 0.8,
            y_min: 0.2,
            y_max: 0.8,
        }
    }
}

impl MappingRegion {
    /// Bounds must be ordered and inside the unit square.
    pub fn is_valid(&self) -> bool {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        in_unit(self.x_min)
            && in_unit(self.x_max)
            && in_unit(self.y_min)
            && in_unit(self.y_max)
            && self.x_min < self.x_max
            && self.y_min < self.y_max
    }
}

/// Linear map from the mapping region onto screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapper {
    region: MappingRegion,
    width: u32,
    height: u32,
    clamp: bool,
}

impl ScreenMapper {
    pub fn new(region: MappingRegion, width: u32, height: u32, clamp: bool) -> Self {
        Self {
            region,
            width,
            height,
            clamp,
        }
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Map a normalized image position to pixels. With clamping enabled the
    /// result always lies on screen.
    pub fn map(&self, (x, y): (f64, f64)) -> ScreenPoint {
        let sx = interpolate(x, self.region.x_min, self.region.x_max, self.width, self.clamp);
        let sy = interpolate(y, self.region.y_min, self.region.y_max, self.height, self.clamp);
        ScreenPoint::new(sx, sy)
    }
}

fn interpolate(value: f64, min: f64, max: f64, extent: u32, clamp: bool) -> i32 {
    let span = f64::from(extent.saturating_sub(1));
    let t = (value - min) / (max - min);
    let t = if clamp { t.clamp(0.0, 1.0) } else { t };
    (t * span).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synthetic::{HandPose, SyntheticHand};

    #[test]
    fn test_distances() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 1.2);
        assert!((distance2d(&a, &b) - 0.5).abs() < 1e-12);
        assert!((distance3d(&a, &b) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_finger_extension_tolerance() {
        let pip = Landmark::new(0.5, 0.50, 0.0);
        let dip = Landmark::new(0.5, 0.47, 0.0);
        let tip = Landmark::new(0.5, 0.44, 0.0);
        assert!(finger_extended(&tip, &dip, &pip, 0.01));
        // Same joints but the margin swallows the 0.03 steps.
        assert!(!finger_extended(&tip, &dip, &pip, 0.05));
    }

    #[test]
    fn test_pose_classification() {
        let hand = SyntheticHand::at(0.5, 0.6);

        let fist = hand.pose(HandPose::Fist);
        assert!(is_fist(&fist, 0.08));
        assert!(!is_fully_open(&fist));

        let open = hand.pose(HandPose::Open);
        assert!(is_fully_open(&open));
        assert!(!is_fist(&open, 0.08));
        assert!(thumb_extended(&open, 0.01));

        let pointing = hand.pose(HandPose::Pointing);
        assert!(long_finger_extended(&pointing, Finger::Index, 0.01));
        assert!(!long_finger_extended(&pointing, Finger::Middle, 0.01));
        assert!(!thumb_extended(&pointing, 0.01));
    }

    #[test]
    fn test_hand_scale_and_pinch() {
        let hand = SyntheticHand::at(0.5, 0.6);
        let closed = hand.pose(HandPose::PinchClosed);
        assert!((hand_scale(&closed) - 0.1).abs() < 1e-9);
        assert!(pinch_distance_2d(&closed) < 0.1 * 0.15);

        let released = hand.pose(HandPose::PinchReleased);
        assert!(pinch_distance_2d(&released) > 0.1 * 0.25);
    }

    #[test]
    fn test_screen_mapping_clamps() {
        let mapper = ScreenMapper::new(MappingRegion::default(), 1920, 1080, true);
        assert_eq!(mapper.map((0.2, 0.2)), ScreenPoint::new(0, 0));
        assert_eq!(mapper.map((0.8, 0.8)), ScreenPoint::new(1919, 1079));
        // A quarter of the way into the region lands on 0.25 of [0, w-1].
        assert_eq!(mapper.map((0.35, 0.35)), ScreenPoint::new(480, 270));
        // The centre sits half a pixel from the middle of the span.
        let centre = mapper.map((0.5, 0.5));
        assert!((f64::from(centre.x) - 959.5).abs() <= 0.5);
        assert!((f64::from(centre.y) - 539.5).abs() <= 0.5);
        assert_eq!(mapper.map((0.0, 1.0)), ScreenPoint::new(0, 1079));
    }

    #[test]
    fn test_screen_mapping_unclamped_extrapolates() {
        let mapper = ScreenMapper::new(MappingRegion::default(), 1920, 1080, false);
        let point = mapper.map((0.9, 0.1));
        assert!(point.x > 1919);
        assert!(point.y < 0);
    }

    #[test]
    fn test_region_validation() {
        assert!(MappingRegion::default().is_valid());
        let inverted = MappingRegion {
            x_min: 0.8,
            x_max: 0.2,
            ..MappingRegion::default()
        };
        assert!(!inverted.is_valid());
    }
}
