//! Camera model building blocks.
//!
//! The camera pipeline has three stages:
//!
//! 1. `ProjectionModel`: map a 3D ray to normalized coordinates (pinhole).
//! 2. `DistortionModel`: apply radial/tangential distortion in normalized space.
//! 3. `IntrinsicsModel`: map normalized coordinates to pixels (K matrix).
//!
//! `pixel = intrinsics(distortion(projection(dir)))`
//!
//! [`Intrinsics`] and [`Pose`] are the calibrated values passed between the
//! pipeline stages and persisted to disk.

mod camera;
mod distortion;
mod intrinsics;
mod projection;

pub use camera::*;
pub use distortion::*;
pub use intrinsics::*;
pub use projection::*;
