//! Geometry core for planar-pattern augmented reality.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, ...),
//! - homogeneous transform construction ([`transform`]),
//! - reference-pattern world coordinates ([`pattern`]),
//! - object models and their vertex transforms ([`model`], [`shapes`], [`mesh`]),
//! - pinhole camera models with Brown-Conrady distortion,
//! - the solver/projector seams consumed by the pipeline ([`backend`]).
//!
//! Camera pipeline:
//! `pixel = K ∘ distortion ∘ projection(dir)`

pub mod backend;
pub mod error;
/// Linear algebra type aliases and helpers.
pub mod math;
pub mod mesh;
pub mod model;
/// Camera models and distortion utilities.
pub mod models;
pub mod pattern;
pub mod shapes;
/// Deterministic synthetic pattern views for tests.
pub mod synthetic;
pub mod transform;

pub use backend::*;
pub use error::{Error, Result};
pub use math::*;
pub use model::{ModelKind, ModelTag, ObjectModel, DEFAULT_MESH_SCALE};
pub use models::*;
pub use pattern::PatternSize;
