//! Wireframe gauntlet cubes drawn over tracked hand landmarks, one cube
//! per joint. Pure frame annotation; drawn on every live frame a hand is
//! tracked.

use kurbo::Point;

use crate::{
    frame::{Frame, Rgb8},
    landmarks::{Detection, LandmarkSet},
};

const JOINT_COLOR: Rgb8 = [255, 255, 0];
const WRIST_COLOR: Rgb8 = [255, 0, 0];

/// Cube half-sizes in pixels: every fourth landmark (wrist, knuckle
/// bases, fingertips) gets the larger hub cube.
const NODE_SIZE: f64 = 5.0;
const HUB_SIZE: f64 = 8.0;

/// Back-face offset as a fraction of the cube size (oblique projection,
/// up and to the right).
const DEPTH_SCALE: f64 = 0.5;

/// One-pixel line, stepped along the longer axis. Out-of-bounds steps
/// are dropped per pixel so partially offscreen cubes clip cleanly.
fn draw_line(frame: &mut Frame, a: Point, b: Point, rgb: Rgb8) {
    let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil() as usize;
    for i in 0..=steps {
        let t = i as f64 / steps.max(1) as f64;
        let x = (a.x + (b.x - a.x) * t).round();
        let y = (a.y + (b.y - a.y) * t).round();
        if x >= 0.0 && y >= 0.0 && (x as u32) < frame.width && (y as u32) < frame.height {
            frame.set_pixel(x as u32, y as u32, rgb);
        }
    }
}

/// Draws a wireframe cube centered at `center`: a front square of
/// half-size `size`, a back square offset up-right, and the four
/// connecting edges.
pub fn draw_cube(frame: &mut Frame, center: Point, size: f64, rgb: Rgb8) {
    let s = size;
    let d = s * DEPTH_SCALE;

    let front = [
        Point::new(center.x - s, center.y - s),
        Point::new(center.x + s, center.y - s),
        Point::new(center.x + s, center.y + s),
        Point::new(center.x - s, center.y + s),
    ];
    let back: [Point; 4] = std::array::from_fn(|i| Point::new(front[i].x + d, front[i].y - d));

    for i in 0..4 {
        let j = (i + 1) % 4;
        draw_line(frame, front[i], front[j], rgb);
        draw_line(frame, back[i], back[j], rgb);
        draw_line(frame, front[i], back[i], rgb);
    }
}

/// Cubes over every landmark of one hand: the wrist in red, everything
/// else in yellow, hubs enlarged.
pub fn draw_hand_cubes(frame: &mut Frame, hand_lm: &LandmarkSet) {
    let (w, h) = (frame.width, frame.height);
    for (i, lm) in hand_lm.iter().enumerate() {
        let size = if i % 4 == 0 { HUB_SIZE } else { NODE_SIZE };
        let rgb = if i == 0 { WRIST_COLOR } else { JOINT_COLOR };
        draw_cube(frame, lm.to_px(w, h), size, rgb);
    }
}

/// Annotates both tracked hands, whichever are present this frame.
pub fn overlay_gauntlets(frame: &mut Frame, detection: &Detection) {
    for hand_lm in [
        detection.right_hand.as_ref(),
        detection.left_hand.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        draw_hand_cubes(frame, hand_lm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, hand};

    #[test]
    fn cube_draws_edges_not_interior() {
        let mut frame = Frame::new(32, 32);
        draw_cube(&mut frame, Point::new(16.0, 16.0), 4.0, [10, 20, 30]);
        // front-face corners
        assert_eq!(frame.pixel(12, 12), [10, 20, 30]);
        assert_eq!(frame.pixel(20, 20), [10, 20, 30]);
        // back face sits up-right by half the size
        assert_eq!(frame.pixel(22, 10), [10, 20, 30]);
        // the cube is hollow
        assert_eq!(frame.pixel(16, 16), [0, 0, 0]);
    }

    #[test]
    fn offscreen_cube_clips_without_panicking() {
        let mut frame = Frame::new(16, 16);
        draw_cube(&mut frame, Point::new(-2.0, -2.0), 5.0, [255, 255, 255]);
        draw_cube(&mut frame, Point::new(30.0, 8.0), 5.0, [255, 255, 255]);
        assert_eq!(frame.pixel(15, 15), [0, 0, 0]);
    }

    #[test]
    fn wrist_cube_is_red_and_joints_yellow() {
        let mut pts = vec![Landmark::new(0.75, 0.75); hand::POINT_COUNT];
        pts[hand::WRIST] = Landmark::new(0.25, 0.25);
        let mut frame = Frame::new(64, 64);
        draw_hand_cubes(&mut frame, &LandmarkSet::new(pts));

        // wrist at (16,16), hub half-size 8: front corner (8,8) is red
        assert_eq!(frame.pixel(8, 8), [255, 0, 0]);
        // the stacked joints at (48,48) draw yellow edges
        assert_eq!(frame.pixel(43, 43), [255, 255, 0]);
    }

    #[test]
    fn both_hands_are_annotated() {
        let right = LandmarkSet::new(vec![Landmark::new(0.25, 0.5); hand::POINT_COUNT]);
        let left = LandmarkSet::new(vec![Landmark::new(0.75, 0.5); hand::POINT_COUNT]);
        let det = Detection {
            right_hand: Some(right),
            left_hand: Some(left),
            ..Detection::default()
        };
        let mut frame = Frame::new(64, 64);
        overlay_gauntlets(&mut frame, &det);
        assert_ne!(frame.pixel(8, 24), [0, 0, 0]);
        assert_ne!(frame.pixel(40, 24), [0, 0, 0]);
    }
}
