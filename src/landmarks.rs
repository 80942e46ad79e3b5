//! Landmark data shapes consumed from the external tracker.
//!
//! Coordinates are normalized to [0, 1] image space; the index of a point
//! inside a set is its anatomical identity (MediaPipe-compatible layouts:
//! 468-point face mesh, 21-point hand, 33-point body pose).

use kurbo::Point;

use crate::frame::Mask;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Relative depth from the tracker; unused by the warps but carried
    /// through for callers that want it.
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Normalized position scaled to pixel space.
    pub fn to_px(&self, width: u32, height: u32) -> Point {
        Point::new(self.x * f64::from(width), self.y * f64::from(height))
    }

    pub fn distance(&self, other: &Landmark) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An ordered set of landmarks for one tracked subject. Index = anatomy.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }

    /// Resolves a fixed index table against this set; `None` if any index
    /// is missing, so callers can skip the dependent layer for the frame.
    pub fn gather(&self, indices: &[usize]) -> Option<Vec<Landmark>> {
        indices.iter().map(|&i| self.get(i).copied()).collect()
    }
}

/// Everything the external tracker produced for one frame. Any part may
/// be absent; absence skips dependent layers for that frame only.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    pub face: Option<LandmarkSet>,
    pub right_hand: Option<LandmarkSet>,
    pub left_hand: Option<LandmarkSet>,
    pub pose: Option<LandmarkSet>,
    pub segmentation: Option<Mask>,
}

impl Detection {
    /// The control hand for gesture classification: the right hand takes
    /// priority, the left is the fallback.
    pub fn primary_hand(&self) -> Option<&LandmarkSet> {
        self.right_hand.as_ref().or(self.left_hand.as_ref())
    }
}

/// 21-point hand layout.
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;

    pub const THUMB_PIP: usize = 2;
    pub const INDEX_PIP: usize = 6;
    pub const MIDDLE_PIP: usize = 10;
    pub const RING_PIP: usize = 14;
    pub const PINKY_PIP: usize = 18;

    pub const POINT_COUNT: usize = 21;

    /// (tip, pip) pairs, thumb first.
    pub const FINGERS: [(usize, usize); 5] = [
        (THUMB_TIP, THUMB_PIP),
        (INDEX_TIP, INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),
        (PINKY_TIP, PINKY_PIP),
    ];
}

/// 33-point body pose layout (the subset the effects need).
pub mod pose {
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;

    pub const POINT_COUNT: usize = 33;
}

/// Face-mesh anchor indices used by the overlays.
pub mod face {
    pub const NOSE_TIP: usize = 1;
    pub const FOREHEAD_TOP: usize = 10;
    pub const UPPER_LIP: usize = 13;
    pub const LEFT_EYE_OUTER: usize = 33;
    pub const LEFT_TEMPLE: usize = 127;
    pub const CHIN: usize = 152;
    pub const RIGHT_EYE_OUTER: usize = 263;
    pub const RIGHT_TEMPLE: usize = 356;
    pub const LEFT_EAR_EDGE: usize = 234;
    pub const RIGHT_EAR_EDGE: usize = 454;

    pub const POINT_COUNT: usize = 468;

    /// Helmet anchor order: left eye, right eye, nose, mouth, chin,
    /// forehead, left side, right side. Matches the helmet source table.
    pub const HELMET_ANCHORS: [usize; 8] = [
        LEFT_EYE_OUTER,
        RIGHT_EYE_OUTER,
        NOSE_TIP,
        UPPER_LIP,
        CHIN,
        FOREHEAD_TOP,
        LEFT_EAR_EDGE,
        RIGHT_EAR_EDGE,
    ];

    /// Hair alignment anchors: left temple, right temple, forehead top.
    pub const HAIR_ANCHORS: [usize; 3] = [LEFT_TEMPLE, RIGHT_TEMPLE, FOREHEAD_TOP];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_px_scales_by_frame_size() {
        let lm = Landmark::new(0.5, 0.25);
        let p = lm.to_px(640, 480);
        assert_eq!(p, Point::new(320.0, 120.0));
    }

    #[test]
    fn gather_requires_all_indices() {
        let set = LandmarkSet::new(vec![Landmark::new(0.0, 0.0), Landmark::new(1.0, 1.0)]);
        assert!(set.gather(&[0, 1]).is_some());
        assert!(set.gather(&[0, 5]).is_none());
    }

    #[test]
    fn primary_hand_prefers_the_right() {
        let right = LandmarkSet::new(vec![Landmark::new(0.7, 0.5)]);
        let left = LandmarkSet::new(vec![Landmark::new(0.3, 0.5)]);

        let both = Detection {
            right_hand: Some(right.clone()),
            left_hand: Some(left.clone()),
            ..Detection::default()
        };
        assert_eq!(both.primary_hand(), Some(&right));

        let left_only = Detection {
            left_hand: Some(left.clone()),
            ..Detection::default()
        };
        assert_eq!(left_only.primary_hand(), Some(&left));

        assert_eq!(Detection::default().primary_hand(), None);
    }

    #[test]
    fn helmet_anchor_table_is_eight_points() {
        assert_eq!(face::HELMET_ANCHORS.len(), 8);
        assert!(face::HELMET_ANCHORS.iter().all(|&i| i < face::POINT_COUNT));
    }
}
