//! Hand-gesture classification with hold-to-confirm debouncing.

use crate::landmarks::{LandmarkSet, hand};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Gesture {
    /// Index + middle extended, ring + pinky curled.
    Peace,
    /// All four non-thumb fingers curled.
    Fist,
    /// All four non-thumb fingers extended.
    OpenHand,
}

/// A finger counts as extended when the wrist→tip distance exceeds the
/// wrist→middle-joint distance. The ratio test is robust to hand rotation
/// where a vertical-position test is not.
pub fn finger_extended(hand_lm: &LandmarkSet, tip: usize, pip: usize) -> Option<bool> {
    let wrist = hand_lm.get(hand::WRIST)?;
    let tip = hand_lm.get(tip)?;
    let pip = hand_lm.get(pip)?;
    Some(wrist.distance(tip) > wrist.distance(pip))
}

/// Extended flags for all five fingers, thumb first.
pub fn extended_flags(hand_lm: &LandmarkSet) -> Option<[bool; 5]> {
    let mut flags = [false; 5];
    for (i, (tip, pip)) in hand::FINGERS.iter().enumerate() {
        flags[i] = finger_extended(hand_lm, *tip, *pip)?;
    }
    Some(flags)
}

/// Exact boolean-pattern classification over the four non-thumb fingers;
/// the thumb is deliberately ignored. Any unlisted pattern is no gesture.
pub fn classify(hand_lm: &LandmarkSet) -> Option<Gesture> {
    let [_thumb, index, middle, ring, pinky] = extended_flags(hand_lm)?;
    match (index, middle, ring, pinky) {
        (true, true, false, false) => Some(Gesture::Peace),
        (false, false, false, false) => Some(Gesture::Fist),
        (true, true, true, true) => Some(Gesture::OpenHand),
        _ => None,
    }
}

/// Hold-to-confirm state. A classified gesture must persist for
/// `hold_secs` of wall-clock time before it is confirmed; confirming arms
/// a `suppress_secs` window that blocks re-confirmation of the same held
/// pose. Losing the hand or the gesture resets the hold timer.
#[derive(Clone, Debug)]
pub struct GestureDetector {
    hold_secs: f64,
    suppress_secs: f64,
    hold_start: Option<f64>,
    last_gesture: Option<Gesture>,
}

impl GestureDetector {
    pub fn new(hold_secs: f64, suppress_secs: f64) -> Self {
        Self {
            hold_secs,
            suppress_secs,
            hold_start: None,
            last_gesture: None,
        }
    }

    /// Advances one frame; returns a gesture only on its confirming frame.
    pub fn update(&mut self, now_s: f64, hand_lm: Option<&LandmarkSet>) -> Option<Gesture> {
        let Some(hand_lm) = hand_lm else {
            self.hold_start = None;
            return None;
        };

        let Some(current) = classify(hand_lm) else {
            self.hold_start = None;
            return None;
        };

        match self.hold_start {
            None => {
                self.hold_start = Some(now_s);
                self.last_gesture = Some(current);
                None
            }
            Some(_) if self.last_gesture != Some(current) => {
                // A different gesture restarts the hold and ends any
                // suppression window.
                self.hold_start = Some(now_s);
                self.last_gesture = Some(current);
                None
            }
            Some(start) if now_s - start >= self.hold_secs => {
                tracing::debug!(gesture = ?current, "gesture confirmed");
                // Pushing the start time into the future suppresses
                // re-confirmation while the same pose is held.
                self.hold_start = Some(now_s + self.suppress_secs);
                Some(current)
            }
            Some(_) => None,
        }
    }
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new(0.3, 5.0)
    }
}
