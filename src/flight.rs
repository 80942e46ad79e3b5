//! The launch/fly/land scene transition: two tiled background textures
//! blended by a vertical offset, a scrolling sky loop, and a one-shot
//! captured silhouette sprite riding on top.

use crate::{
    assets::AssetLibrary,
    composite,
    frame::{Frame, Mask},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightPhase {
    Idle,
    Launching,
    Flying,
    Landing,
}

/// Per-frame offsets, in pixels per processed frame.
const LAUNCH_SPEED_START: f64 = 20.0;
const LAUNCH_ACCEL: f64 = 2.0;
const LANDING_SPEED: f64 = 30.0;
const SKY_SCROLL_SPEED: f64 = 5.0;

#[derive(Clone, Debug)]
pub struct FlightRig {
    width: u32,
    height: u32,
    phase: FlightPhase,
    /// 0 = full ground, `height` = full sky.
    offset: f64,
    launch_speed: f64,
    sky_scroll: f64,
    /// Sky texture tiled to 2× frame height so the scroll can wrap
    /// without a visible seam.
    sky: Frame,
    ground: Frame,
    sprite: Option<(Frame, Mask)>,
}

impl FlightRig {
    pub fn new(width: u32, height: u32, library: &AssetLibrary) -> Self {
        Self {
            width,
            height,
            phase: FlightPhase::Idle,
            offset: 0.0,
            launch_speed: LAUNCH_SPEED_START,
            sky_scroll: 0.0,
            sky: library.sky.frame.resize_bilinear(width, height * 2),
            ground: library.ground.frame.resize_bilinear(width, height),
            sprite: None,
        }
    }

    /// Adapts the rig to a new frame size without dropping an in-flight
    /// transition: backgrounds are rebuilt and the vertical offset and
    /// scroll rescale to the new height. The captured sprite keeps its
    /// old resolution; compositing resizes it per frame.
    pub fn resize(&mut self, width: u32, height: u32, library: &AssetLibrary) {
        if (self.width, self.height) == (width, height) {
            return;
        }
        let scale = f64::from(height) / f64::from(self.height.max(1));
        self.offset *= scale;
        self.sky_scroll *= scale;
        self.width = width;
        self.height = height;
        self.sky = library.sky.frame.resize_bilinear(width, height * 2);
        self.ground = library.ground.frame.resize_bilinear(width, height);
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Starts the launch and captures the subject sprite: the live frame
    /// through the segmentation mask, owned until the next launch
    /// overwrites it. Without a mask no sprite is captured and the
    /// backgrounds render bare.
    pub fn trigger_launch(&mut self, live: &Frame, segmentation: Option<&Mask>) {
        tracing::debug!("flight launch");
        self.phase = FlightPhase::Launching;
        self.offset = 0.0;
        self.launch_speed = LAUNCH_SPEED_START;
        self.sprite = segmentation.map(|seg| {
            let mask = seg.resize_nearest(self.width, self.height);
            let mut cut = Frame::new(self.width, self.height);
            let live = live.resize_bilinear(self.width, self.height);
            composite::alpha_blend_in_place(&mut cut, &live, &mask);
            (cut, mask)
        });
    }

    pub fn trigger_landing(&mut self) {
        tracing::debug!("flight landing");
        self.phase = FlightPhase::Landing;
        self.offset = f64::from(self.height);
    }

    /// Produces the next background frame (sprite composited), advancing
    /// one animation step. Returns `None` in `Idle`, and `None` exactly
    /// once when a landing reaches the ground, after which the caller
    /// shows live video again.
    pub fn advance(&mut self) -> Option<Frame> {
        match self.phase {
            FlightPhase::Idle => None,
            FlightPhase::Launching => {
                let frame = self.transition_frame(self.offset);
                self.offset += self.launch_speed;
                self.launch_speed += LAUNCH_ACCEL;
                if self.offset >= f64::from(self.height) {
                    self.phase = FlightPhase::Flying;
                    self.sky_scroll = 0.0;
                }
                Some(self.with_sprite(frame))
            }
            FlightPhase::Flying => {
                let wrap = f64::from(self.height);
                self.sky_scroll = (self.sky_scroll - SKY_SCROLL_SPEED).rem_euclid(wrap);
                let frame = self.sky_slice(self.sky_scroll as u32);
                Some(self.with_sprite(frame))
            }
            FlightPhase::Landing => {
                let frame = self.transition_frame(self.offset);
                self.offset -= LANDING_SPEED;
                if self.offset <= 0.0 {
                    self.phase = FlightPhase::Idle;
                    return None;
                }
                Some(self.with_sprite(frame))
            }
        }
    }

    /// Ground slides down out of frame while the sky's lower edge enters
    /// from the top; `offset` 0 is all ground, `height` all sky.
    fn transition_frame(&self, offset: f64) -> Frame {
        let h = self.height as usize;
        let offset = (offset.round().max(0.0) as usize).min(h);
        let mut frame = Frame::new(self.width, self.height);
        let stride = self.width as usize * 3;

        // ground occupies rows [offset, h), read from the texture top
        let ground_rows = h - offset;
        if ground_rows > 0 {
            frame.data[offset * stride..h * stride]
                .copy_from_slice(&self.ground.data[..ground_rows * stride]);
        }

        // sky enters from the top, bottom edge first
        if offset > 0 {
            let src_top = h - offset;
            frame.data[..offset * stride]
                .copy_from_slice(&self.sky.data[src_top * stride..h * stride]);
        }
        frame
    }

    fn sky_slice(&self, top_row: u32) -> Frame {
        let stride = self.width as usize * 3;
        let top = top_row.min(self.height) as usize;
        let mut frame = Frame::new(self.width, self.height);
        frame
            .data
            .copy_from_slice(&self.sky.data[top * stride..(top + self.height as usize) * stride]);
        frame
    }

    fn with_sprite(&self, mut background: Frame) -> Frame {
        if let Some((sprite, mask)) = self.sprite.as_ref() {
            composite::alpha_blend_in_place(&mut background, sprite, mask);
        }
        background
    }
}
