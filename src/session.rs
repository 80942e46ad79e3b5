//! Frame-synchronous orchestration: one `SessionState` owns every piece
//! of mutable state and is advanced exactly once per captured frame.

use kurbo::Point;

use crate::{
    assets::AssetLibrary,
    effects::{EffectKind, EffectRig},
    error::{SuitupError, SuitupResult},
    flight::{FlightPhase, FlightRig},
    frame::Frame,
    gauntlet,
    gesture::GestureDetector,
    landmarks::{Detection, LandmarkSet, pose as pidx},
    pose::{self, HoldTimer},
    shield,
};

/// Tunable timings and speeds. Loaded from JSON by the CLI; defaults
/// match the reference behavior.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Continuous seconds a gesture must hold before it confirms.
    pub gesture_hold_secs: f64,
    /// Seconds a confirmed gesture is suppressed from re-firing.
    pub gesture_suppress_secs: f64,
    /// Reveal-circle growth in pixels per processed frame.
    pub growth_speed: f64,
    /// Seconds the flight pose must hold before launching.
    pub flight_engage_secs: f64,
    /// Seconds of pose loss before landing begins.
    pub flight_release_secs: f64,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            gesture_hold_secs: 0.3,
            gesture_suppress_secs: 5.0,
            growth_speed: 30.0,
            flight_engage_secs: 2.0,
            flight_release_secs: 2.0,
        }
    }
}

impl RigConfig {
    pub fn validate(&self) -> SuitupResult<()> {
        let fields = [
            ("gesture_hold_secs", self.gesture_hold_secs),
            ("gesture_suppress_secs", self.gesture_suppress_secs),
            ("growth_speed", self.growth_speed),
            ("flight_engage_secs", self.flight_engage_secs),
            ("flight_release_secs", self.flight_release_secs),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(SuitupError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }
}

/// One processed frame's input: the captured image, whatever the
/// external tracker produced for it, and a wall-clock timestamp.
#[derive(Clone, Debug)]
pub struct FrameInput {
    pub frame: Frame,
    pub detection: Detection,
    pub now_s: f64,
}

/// All per-session state. Immutable assets, mutable animation state, no
/// globals; the struct is advanced by exactly one thread, one call per
/// frame.
pub struct SessionState {
    assets: AssetLibrary,
    config: RigConfig,
    gestures: GestureDetector,
    effects: EffectRig,
    flight: FlightRig,
    flight_dims: (u32, u32),
    engage_hold: HoldTimer,
    release_hold: HoldTimer,
}

impl SessionState {
    pub fn new(assets: AssetLibrary, config: RigConfig, width: u32, height: u32) -> Self {
        let flight = FlightRig::new(width, height, &assets);
        Self {
            gestures: GestureDetector::new(config.gesture_hold_secs, config.gesture_suppress_secs),
            effects: EffectRig::new(config.growth_speed),
            flight,
            flight_dims: (width, height),
            engage_hold: HoldTimer::new(config.flight_engage_secs),
            release_hold: HoldTimer::new(config.flight_release_secs),
            assets,
            config,
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn effects(&self) -> &EffectRig {
        &self.effects
    }

    pub fn flight_phase(&self) -> FlightPhase {
        self.flight.phase()
    }

    /// Runs one frame through the pipeline: gesture confirmation feeds
    /// the effect machine, the flight pose feeds the transition engine,
    /// and whichever is active composes the output. Every failure mode
    /// degrades a single frame; nothing here aborts the loop.
    pub fn process_frame(&mut self, input: &FrameInput) -> Frame {
        let frame = &input.frame;
        let (w, h) = (frame.width, frame.height);

        // Resolution change mid-run rescales the flight rig in place so
        // an in-progress transition keeps playing.
        if self.flight_dims != (w, h) {
            self.flight.resize(w, h, &self.assets);
            self.flight_dims = (w, h);
        }

        if let Some(gesture) = self
            .gestures
            .update(input.now_s, input.detection.primary_hand())
        {
            let anchor = input.detection.pose.as_ref().and_then(|b| chest_center(b, w, h));
            self.effects
                .activate(EffectKind::from_gesture(gesture), anchor, w, h);
        }

        self.update_flight(input);

        if self.flight.phase() != FlightPhase::Idle {
            if let Some(background) = self.flight.advance() {
                return background;
            }
            // landing just completed; fall through to the live view
        }

        let mut output = self
            .effects
            .advance_and_render(frame, &input.detection, &self.assets);

        gauntlet::overlay_gauntlets(&mut output, &input.detection);

        if let Some(body) = input.detection.pose.as_ref()
            && let Some(arm) = pose::cross_body(body)
        {
            shield::overlay_shield(&mut output, body, &arm, &self.assets.shield);
        }

        output
    }

    fn update_flight(&mut self, input: &FrameInput) {
        let posed = input
            .detection
            .pose
            .as_ref()
            .map(pose::flight_pose)
            .unwrap_or(false);

        match self.flight.phase() {
            FlightPhase::Idle => {
                self.release_hold.reset();
                if self.engage_hold.update(input.now_s, posed) {
                    self.flight
                        .trigger_launch(&input.frame, input.detection.segmentation.as_ref());
                    self.engage_hold.reset();
                }
            }
            FlightPhase::Launching | FlightPhase::Flying => {
                self.engage_hold.reset();
                if self.release_hold.update(input.now_s, !posed) {
                    self.flight.trigger_landing();
                    self.release_hold.reset();
                }
            }
            FlightPhase::Landing => {}
        }
    }
}

/// Chest anchor for the reveal circle: mean of shoulders and hips.
fn chest_center(body: &LandmarkSet, width: u32, height: u32) -> Option<Point> {
    let anchors = body.gather(&[
        pidx::LEFT_SHOULDER,
        pidx::RIGHT_SHOULDER,
        pidx::LEFT_HIP,
        pidx::RIGHT_HIP,
    ])?;
    let mut sum = Point::ZERO;
    for lm in &anchors {
        let p = lm.to_px(width, height);
        sum.x += p.x;
        sum.y += p.y;
    }
    Some(Point::new(sum.x / 4.0, sum.y / 4.0))
}
