//! Stateless body-pose predicates plus a small wall-clock hold timer the
//! session loop uses to debounce them across frames.

use kurbo::Point;

use crate::landmarks::{Landmark, LandmarkSet, pose};

/// Wrist raised above its shoulder by more than this fraction of frame
/// height counts as the flight trigger.
pub const FLIGHT_RAISE_THRESHOLD: f64 = 0.1;

/// Wrist within this normalized distance of the opposite shoulder counts
/// as a cross-body pose.
pub const CROSS_BODY_THRESHOLD: f64 = 0.25;

/// True when either wrist is significantly above its shoulder
/// (normalized y decreases upward).
pub fn flight_pose(body: &LandmarkSet) -> bool {
    let raised = |shoulder: usize, wrist: usize| -> Option<bool> {
        let s = body.get(shoulder)?;
        let w = body.get(wrist)?;
        Some(s.y - w.y > FLIGHT_RAISE_THRESHOLD)
    };

    raised(pose::LEFT_SHOULDER, pose::LEFT_WRIST).unwrap_or(false)
        || raised(pose::RIGHT_SHOULDER, pose::RIGHT_WRIST).unwrap_or(false)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmSide {
    Left,
    Right,
}

/// A detected cross-body arm: which arm crossed and its forearm endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossedArm {
    pub side: ArmSide,
    pub elbow: Landmark,
    pub wrist: Landmark,
}

/// Detects an arm crossing the chest (wrist near the opposite shoulder).
/// The right arm is checked first, matching the trigger priority of the
/// shield pose.
pub fn cross_body(body: &LandmarkSet) -> Option<CrossedArm> {
    let ls = body.get(pose::LEFT_SHOULDER)?;
    let rs = body.get(pose::RIGHT_SHOULDER)?;
    let le = body.get(pose::LEFT_ELBOW)?;
    let re = body.get(pose::RIGHT_ELBOW)?;
    let lw = body.get(pose::LEFT_WRIST)?;
    let rw = body.get(pose::RIGHT_WRIST)?;

    if rw.distance(ls) < CROSS_BODY_THRESHOLD {
        return Some(CrossedArm {
            side: ArmSide::Right,
            elbow: *re,
            wrist: *rw,
        });
    }
    if lw.distance(rs) < CROSS_BODY_THRESHOLD {
        return Some(CrossedArm {
            side: ArmSide::Left,
            elbow: *le,
            wrist: *lw,
        });
    }
    None
}

/// Shoulder span in pixels; the scale reference for the shield overlay.
pub fn shoulder_width_px(body: &LandmarkSet, width: u32, height: u32) -> Option<f64> {
    let ls = body.get(pose::LEFT_SHOULDER)?.to_px(width, height);
    let rs = body.get(pose::RIGHT_SHOULDER)?.to_px(width, height);
    Some(((ls.x - rs.x).powi(2) + (ls.y - rs.y).powi(2)).sqrt())
}

/// Builds a destination quad around a limb segment by offsetting both
/// endpoints along the segment normal. The far end is tapered to 70% of
/// the half-width. Returns `None` for a zero-length segment.
pub fn limb_quad(start: Point, end: Point, half_width: f64) -> Option<[Point; 4]> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let dist = dx.hypot(dy);
    if dist == 0.0 {
        return None;
    }
    let nx = -dy / dist;
    let ny = dx / dist;
    let taper = 0.7;
    Some([
        Point::new(start.x + nx * half_width, start.y + ny * half_width),
        Point::new(start.x - nx * half_width, start.y - ny * half_width),
        Point::new(end.x - nx * half_width * taper, end.y - ny * half_width * taper),
        Point::new(end.x + nx * half_width * taper, end.y + ny * half_width * taper),
    ])
}

/// Reports whether a boolean condition has held continuously for a given
/// wall-clock duration. One instance per debounced signal.
#[derive(Clone, Debug)]
pub struct HoldTimer {
    duration_secs: f64,
    since: Option<f64>,
}

impl HoldTimer {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            since: None,
        }
    }

    pub fn update(&mut self, now_s: f64, condition: bool) -> bool {
        if !condition {
            self.since = None;
            return false;
        }
        let since = *self.since.get_or_insert(now_s);
        now_s - since >= self.duration_secs
    }

    pub fn reset(&mut self) {
        self.since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with(slots: &[(usize, f64, f64)]) -> LandmarkSet {
        let mut pts = vec![Landmark::new(0.5, 0.5); pose::POINT_COUNT];
        for &(i, x, y) in slots {
            pts[i] = Landmark::new(x, y);
        }
        LandmarkSet::new(pts)
    }

    #[test]
    fn raised_wrist_triggers_flight_pose() {
        let body = body_with(&[
            (pose::LEFT_SHOULDER, 0.4, 0.5),
            (pose::LEFT_WRIST, 0.4, 0.2),
            (pose::RIGHT_SHOULDER, 0.6, 0.5),
            (pose::RIGHT_WRIST, 0.6, 0.6),
        ]);
        assert!(flight_pose(&body));
    }

    #[test]
    fn slightly_raised_wrist_is_not_enough() {
        let body = body_with(&[
            (pose::LEFT_SHOULDER, 0.4, 0.5),
            (pose::LEFT_WRIST, 0.4, 0.45),
            (pose::RIGHT_SHOULDER, 0.6, 0.5),
            (pose::RIGHT_WRIST, 0.6, 0.45),
        ]);
        assert!(!flight_pose(&body));
    }

    #[test]
    fn cross_body_reports_the_crossing_side() {
        let body = body_with(&[
            (pose::LEFT_SHOULDER, 0.35, 0.4),
            (pose::RIGHT_SHOULDER, 0.65, 0.4),
            (pose::RIGHT_WRIST, 0.4, 0.45),
            (pose::LEFT_WRIST, 0.2, 0.8),
        ]);
        let crossed = cross_body(&body).unwrap();
        assert_eq!(crossed.side, ArmSide::Right);
    }

    #[test]
    fn no_cross_when_arms_are_apart() {
        let body = body_with(&[
            (pose::LEFT_SHOULDER, 0.35, 0.4),
            (pose::RIGHT_SHOULDER, 0.65, 0.4),
            (pose::LEFT_WRIST, 0.1, 0.8),
            (pose::RIGHT_WRIST, 0.9, 0.8),
        ]);
        assert!(cross_body(&body).is_none());
    }

    #[test]
    fn limb_quad_rejects_zero_length() {
        let p = Point::new(3.0, 4.0);
        assert!(limb_quad(p, p, 10.0).is_none());
        assert!(limb_quad(p, Point::new(9.0, 4.0), 10.0).is_some());
    }

    #[test]
    fn hold_timer_requires_continuous_condition() {
        let mut t = HoldTimer::new(2.0);
        assert!(!t.update(0.0, true));
        assert!(!t.update(1.5, true));
        assert!(t.update(2.0, true));
        assert!(!t.update(2.5, false));
        assert!(!t.update(3.0, true));
        assert!(t.update(5.0, true));
    }
}
