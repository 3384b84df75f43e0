//! Hand landmark data as produced by an external hand tracker.
//!
//! A frame is 21 points in normalized image space (x and y in [0, 1], y
//! pointing down, image already mirrored so +x is the user's right) plus a
//! relative depth z. Indices follow the usual anatomical labelling.

use serde::{Deserialize, Serialize};

/// Number of landmarks in one hand frame.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// One tracked point.
///
/// Deserializes from either `{"x": .., "y": .., "z": ..}` or `[x, y, z]`;
/// z is optional in both forms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar position, dropping depth.
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
    Array(Vec<f64>),
}

impl TryFrom<LandmarkRepr> for Landmark {
    type Error = FrameError;

    fn try_from(repr: LandmarkRepr) -> Result<Self, Self::Error> {
        match repr {
            LandmarkRepr::Object { x, y, z } => Ok(Landmark::new(x, y, z)),
            LandmarkRepr::Array(values) => match values.as_slice() {
                [x, y] => Ok(Landmark::new(*x, *y, 0.0)),
                [x, y, z] => Ok(Landmark::new(*x, *y, *z)),
                _ => Err(FrameError::BadPoint(format!(
                    "expected 2 or 3 coordinates, got {}",
                    values.len()
                ))),
            },
        }
    }
}

/// The four long fingers, for indexing their joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn mcp(self) -> usize {
        match self {
            Finger::Index => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring => RING_MCP,
            Finger::Pinky => PINKY_MCP,
        }
    }

    pub fn pip(self) -> usize {
        self.mcp() + 1
    }

    pub fn dip(self) -> usize {
        self.mcp() + 2
    }

    pub fn tip(self) -> usize {
        self.mcp() + 3
    }
}

/// A complete, validated set of 21 landmarks for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Validate a point list coming from the tracker.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, FrameError> {
        if points.len() != LANDMARK_COUNT {
            return Err(FrameError::WrongCount {
                expected: LANDMARK_COUNT,
                found: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(FrameError::NonFinite { index });
        }

        let mut array = [Landmark::default(); LANDMARK_COUNT];
        array.copy_from_slice(points);
        Ok(Self { points: array })
    }

    pub fn from_array(points: [Landmark; LANDMARK_COUNT]) -> Result<Self, FrameError> {
        Self::from_slice(&points)
    }

    /// For points built in-crate from finite constants.
    pub(crate) fn from_trusted(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Point at an anatomical index (one of the constants in this module).
    pub fn point(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    pub fn wrist(&self) -> &Landmark {
        &self.points[WRIST]
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

/// Why a tracker frame was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    WrongCount { expected: usize, found: usize },
    NonFinite { index: usize },
    BadPoint(String),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::WrongCount { expected, found } => {
                write!(f, "expected {expected} landmarks, found {found}")
            }
            FrameError::NonFinite { index } => write!(f, "landmark {index} is not finite"),
            FrameError::BadPoint(e) => write!(f, "bad landmark: {e}"),
        }
    }
}

impl std::error::Error for FrameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finger_joint_indices() {
        assert_eq!(Finger::Index.tip(), INDEX_TIP);
        assert_eq!(Finger::Middle.pip(), MIDDLE_PIP);
        assert_eq!(Finger::Ring.dip(), RING_DIP);
        assert_eq!(Finger::Pinky.mcp(), PINKY_MCP);
    }

    #[test]
    fn test_frame_requires_21_points() {
        let points = vec![Landmark::new(0.5, 0.5, 0.0); 20];
        assert_eq!(
            LandmarkFrame::from_slice(&points),
            Err(FrameError::WrongCount {
                expected: 21,
                found: 20
            })
        );
    }

    #[test]
    fn test_frame_rejects_nan() {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        points[7].y = f64::NAN;
        assert_eq!(
            LandmarkFrame::from_slice(&points),
            Err(FrameError::NonFinite { index: 7 })
        );
    }

    #[test]
    fn test_landmark_accepts_both_json_forms() {
        let from_object: Landmark = serde_json::from_str(r#"{"x":0.1,"y":0.2,"z":-0.3}"#).unwrap();
        let from_array: Landmark = serde_json::from_str("[0.1, 0.2, -0.3]").unwrap();
        assert_eq!(from_object, from_array);

        let planar: Landmark = serde_json::from_str("[0.4, 0.6]").unwrap();
        assert_eq!(planar, Landmark::new(0.4, 0.6, 0.0));

        assert!(serde_json::from_str::<Landmark>("[0.4]").is_err());
    }
}
