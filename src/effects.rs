//! The effect state machine: which overlay is active, its expanding
//! circular reveal, and the per-kind render pipelines.

use kurbo::Point;

use crate::{
    assets::{self, AssetLibrary},
    composite,
    frame::{Frame, Mask},
    gesture::Gesture,
    landmarks::{Detection, LandmarkSet, face, pose},
    warp,
};

/// Skin tint for the Hulk effect and its fixed blend opacity.
const HULK_TINT: [u8; 3] = [0, 200, 0];
const HULK_TINT_OPACITY: f32 = 0.4;

/// Pixel padding applied around the torso destination quad.
const TORSO_PAD: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EffectKind {
    Hulk,
    IronMan,
    BlackWidow,
}

impl EffectKind {
    pub fn from_gesture(gesture: Gesture) -> EffectKind {
        match gesture {
            Gesture::Fist => EffectKind::Hulk,
            Gesture::Peace => EffectKind::IronMan,
            Gesture::OpenHand => EffectKind::BlackWidow,
        }
    }
}

/// Mutable state of the currently active effect.
#[derive(Clone, Debug)]
pub struct EffectState {
    pub kind: EffectKind,
    pub growth_radius: f64,
    pub growth_center: Point,
}

/// Drives effect activation and the per-frame reveal animation. The
/// radius advances once per processed frame; animation speed is coupled
/// to achieved frame rate.
#[derive(Clone, Debug)]
pub struct EffectRig {
    active: Option<EffectState>,
    growth_speed: f64,
}

impl EffectRig {
    pub fn new(growth_speed: f64) -> Self {
        Self {
            active: None,
            growth_speed,
        }
    }

    pub fn state(&self) -> Option<&EffectState> {
        self.active.as_ref()
    }

    pub fn active_kind(&self) -> Option<EffectKind> {
        self.active.as_ref().map(|s| s.kind)
    }

    /// Activates an effect, restarting the reveal from zero. Activating
    /// the kind that is already active is a no-op; a different kind
    /// replaces it.
    pub fn activate(&mut self, kind: EffectKind, anchor: Option<Point>, width: u32, height: u32) {
        if self.active_kind() == Some(kind) {
            return;
        }
        let center =
            anchor.unwrap_or_else(|| Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0));
        tracing::debug!(?kind, ?center, "effect activated");
        self.active = Some(EffectState {
            kind,
            growth_radius: 0.0,
            growth_center: center,
        });
    }

    /// Advances the reveal one frame and renders the active effect over
    /// `frame`. Landmark sets the effect needs but that are absent this
    /// frame skip just that layer; nothing here fails the frame.
    pub fn advance_and_render(
        &mut self,
        frame: &Frame,
        detection: &Detection,
        library: &AssetLibrary,
    ) -> Frame {
        let Some(state) = self.active.as_mut() else {
            return frame.clone();
        };

        // Recomputed every frame so resolution changes mid-run rescale
        // the reveal rather than freezing it.
        let max_radius = f64::from(frame.width).hypot(f64::from(frame.height));
        state.growth_radius = (state.growth_radius + self.growth_speed).min(max_radius);

        let mut reveal = Mask::new(frame.width, frame.height);
        reveal.fill_disc(
            state.growth_center.x,
            state.growth_center.y,
            state.growth_radius,
        );

        let mut output = frame.clone();
        match state.kind {
            EffectKind::Hulk => {
                if let Some(seg) = detection.segmentation.as_ref() {
                    let subject = seg
                        .resize_nearest(frame.width, frame.height)
                        .binarized(0.5)
                        .intersected(&reveal);
                    composite::tint_blend_in_place(
                        &mut output,
                        HULK_TINT,
                        HULK_TINT_OPACITY,
                        &subject,
                    );
                }
            }
            EffectKind::IronMan => {
                let mut candidate = frame.clone();
                if let Some(body) = detection.pose.as_ref() {
                    render_torso_suit(&mut candidate, body, library);
                }
                if let Some(face_lm) = detection.face.as_ref() {
                    render_helmet(&mut candidate, face_lm, library);
                }
                composite::binary_merge_in_place(&mut output, &candidate, &reveal);
            }
            EffectKind::BlackWidow => {
                let mut candidate = frame.clone();
                if let Some(face_lm) = detection.face.as_ref() {
                    render_hair(&mut candidate, face_lm, library);
                }
                composite::binary_merge_in_place(&mut output, &candidate, &reveal);
            }
        }
        output
    }
}

impl Default for EffectRig {
    fn default() -> Self {
        Self::new(30.0)
    }
}

/// Warps the suit texture's torso panel onto the shoulder/hip quad,
/// padded outward for width. Skipped when landmarks or geometry are
/// unusable.
fn render_torso_suit(candidate: &mut Frame, body: &LandmarkSet, library: &AssetLibrary) {
    let (w, h) = (candidate.width, candidate.height);
    let Some(anchors) = body.gather(&[
        pose::LEFT_SHOULDER,
        pose::RIGHT_SHOULDER,
        pose::RIGHT_HIP,
        pose::LEFT_HIP,
    ]) else {
        return;
    };
    let [ls, rs, rh, lh]: [Point; 4] = std::array::from_fn(|i| anchors[i].to_px(w, h));

    let dst = [
        Point::new(ls.x - TORSO_PAD, ls.y - TORSO_PAD),
        Point::new(rs.x + TORSO_PAD, rs.y - TORSO_PAD),
        Point::new(rh.x + TORSO_PAD, rh.y + TORSO_PAD),
        Point::new(lh.x - TORSO_PAD, lh.y + TORSO_PAD),
    ];
    let src = assets::torso_src_quad(library.bodysuit.width(), library.bodysuit.height());

    if let Err(err) = warp::warp_quad(&library.bodysuit.frame, candidate, &src, &dst) {
        tracing::debug!(%err, "torso quad skipped");
    }
}

/// Mesh-warps the helmet texture over the face anchors. Each triangle is
/// composited into a zeroed accumulator, then the accumulated helmet is
/// merged by luminance threshold so triangle seams replace rather than
/// blend with the camera pixels.
fn render_helmet(candidate: &mut Frame, face_lm: &LandmarkSet, library: &AssetLibrary) {
    let (w, h) = (candidate.width, candidate.height);
    let Some(anchors) = face_lm.gather(&face::HELMET_ANCHORS) else {
        return;
    };
    let dst_points: Vec<Point> = anchors.iter().map(|lm| lm.to_px(w, h)).collect();
    let src_points = assets::helmet_src_points(library.helmet.width(), library.helmet.height());

    let mut accum = Frame::new(w, h);
    for (a, b, c) in assets::HELMET_TRIANGLES {
        let src_tri = [src_points[a], src_points[b], src_points[c]];
        let dst_tri = [dst_points[a], dst_points[b], dst_points[c]];
        if let Err(err) = warp::warp_triangle(&library.helmet.frame, &mut accum, &src_tri, &dst_tri)
        {
            // Occluded or extreme poses collapse triangles; drop them.
            tracing::debug!(%err, "helmet triangle skipped");
        }
    }

    let mask = Mask::from_luminance_threshold(&accum, warp::FOREGROUND_LUMA_THRESHOLD);
    composite::binary_merge_in_place(candidate, &accum, &mask);
}

/// Single affine warp aligning the hair texture with the temples and
/// hairline.
fn render_hair(candidate: &mut Frame, face_lm: &LandmarkSet, library: &AssetLibrary) {
    let (w, h) = (candidate.width, candidate.height);
    let Some(anchors) = face_lm.gather(&face::HAIR_ANCHORS) else {
        return;
    };
    let dst: [Point; 3] = std::array::from_fn(|i| anchors[i].to_px(w, h));
    let src = assets::hair_src_points(library.hair.width(), library.hair.height());

    match crate::geom::solve_affine(&src, &dst) {
        Ok(map) => {
            if let Err(err) = warp::warp_affine_over(&library.hair.frame, candidate, map) {
                tracing::debug!(%err, "hair overlay skipped");
            }
        }
        Err(err) => tracing::debug!(%err, "hair overlay skipped"),
    }
}
