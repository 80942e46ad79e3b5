//! Forearm shield overlay, summoned by the cross-body pose.

use kurbo::{Affine, Point, Vec2};

use crate::{
    assets::Texture,
    composite,
    frame::Frame,
    landmarks::LandmarkSet,
    pose::{self, CrossedArm},
    warp,
};

/// Shield diameter as a multiple of the shoulder span.
const SHIELD_SCALE: f64 = 1.5;
const SHIELD_MIN_PX: f64 = 50.0;

/// Composites the shield over the crossing forearm: centered on the
/// elbow→wrist midpoint, scaled from the shoulder span (the arm length
/// foreshortens toward the camera; shoulders do not), and rotated so the
/// shield's upright axis follows the forearm. Stateless; clipping at the
/// frame edges is handled by the resampling.
pub fn overlay_shield(frame: &mut Frame, body: &LandmarkSet, arm: &CrossedArm, shield: &Texture) {
    let (w, h) = (frame.width, frame.height);
    let Some(shoulder_span) = pose::shoulder_width_px(body, w, h) else {
        return;
    };

    let elbow = arm.elbow.to_px(w, h);
    let wrist = arm.wrist.to_px(w, h);
    let center = Point::new((elbow.x + wrist.x) / 2.0, (elbow.y + wrist.y) / 2.0);

    let size = (shoulder_span * SHIELD_SCALE).max(SHIELD_MIN_PX);
    let angle = (wrist.y - elbow.y).atan2(wrist.x - elbow.x);

    let (tw, th) = (f64::from(shield.width()), f64::from(shield.height()));
    if tw == 0.0 || th == 0.0 {
        return;
    }

    let map = Affine::translate(Vec2::new(center.x, center.y))
        * Affine::rotate(angle + std::f64::consts::FRAC_PI_2)
        * Affine::scale_non_uniform(size / tw, size / th)
        * Affine::translate(Vec2::new(-tw / 2.0, -th / 2.0));

    let layer = warp::affine_layer(&shield.frame, map, w, h);
    match shield.alpha.as_ref() {
        Some(alpha) => {
            let alpha_layer = warp::affine_mask_layer(alpha, map, w, h);
            composite::alpha_blend_in_place(frame, &layer, &alpha_layer);
        }
        None => {
            let mask =
                crate::frame::Mask::from_luminance_threshold(&layer, warp::FOREGROUND_LUMA_THRESHOLD);
            composite::binary_merge_in_place(frame, &layer, &mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::placeholder_shield;
    use crate::landmarks::{Landmark, pose as pidx};

    fn body() -> LandmarkSet {
        let mut pts = vec![Landmark::new(0.5, 0.5); pidx::POINT_COUNT];
        pts[pidx::LEFT_SHOULDER] = Landmark::new(0.35, 0.4);
        pts[pidx::RIGHT_SHOULDER] = Landmark::new(0.65, 0.4);
        LandmarkSet::new(pts)
    }

    fn crossed_arm() -> CrossedArm {
        CrossedArm {
            side: pose::ArmSide::Right,
            elbow: Landmark::new(0.6, 0.6),
            wrist: Landmark::new(0.4, 0.45),
        }
    }

    #[test]
    fn shield_lands_on_the_forearm_midpoint() {
        let mut frame = Frame::new(100, 100);
        let shield = placeholder_shield(40);
        overlay_shield(&mut frame, &body(), &crossed_arm(), &shield);
        // midpoint of elbow (60,60) and wrist (40,45)
        assert_ne!(frame.pixel(50, 52), [0, 0, 0]);
    }

    #[test]
    fn offscreen_parts_are_clipped_not_fatal() {
        let mut frame = Frame::new(40, 40);
        let shield = placeholder_shield(40);
        let arm = CrossedArm {
            side: pose::ArmSide::Left,
            elbow: Landmark::new(0.0, 0.0),
            wrist: Landmark::new(-0.2, -0.1),
        };
        overlay_shield(&mut frame, &body(), &arm, &shield);
        // nothing to assert beyond completing without panicking and
        // leaving far pixels untouched
        assert_eq!(frame.pixel(39, 39), [0, 0, 0]);
    }
}
