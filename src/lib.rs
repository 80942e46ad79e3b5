#![forbid(unsafe_code)]

pub mod assets;
pub mod composite;
pub mod effects;
pub mod error;
pub mod flight;
pub mod frame;
pub mod gauntlet;
pub mod geom;
pub mod gesture;
pub mod landmarks;
pub mod pose;
pub mod session;
pub mod shield;
pub mod warp;

pub use assets::{AssetLibrary, Texture};
pub use effects::{EffectKind, EffectRig};
pub use error::{SuitupError, SuitupResult};
pub use flight::{FlightPhase, FlightRig};
pub use frame::{Frame, Mask, Rgb8};
pub use gesture::{Gesture, GestureDetector};
pub use landmarks::{Detection, Landmark, LandmarkSet};
pub use pose::{ArmSide, CrossedArm, HoldTimer};
pub use session::{FrameInput, RigConfig, SessionState};
