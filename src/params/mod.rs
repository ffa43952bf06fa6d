//! Parameter definitions with physical units and documented semantics.
//!
//! All tunables are collected here with:
//! - Physical units (meters, seconds, degrees, etc.)
//! - Documented ranges and meanings
//! - Fail-fast validation for values the pipeline cannot run with

mod camera;
mod lighting;
mod ocean;
mod render;

// Re-export all types
pub use camera::CameraParams;
pub use lighting::LightingParams;
pub use ocean::WaveParams;
pub use render::{RecordingConfig, RenderConfig};

use thiserror::Error;

/// Configuration the pipeline refuses to start with
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("simulation resolution must be a power of two, got {0}")]
    ResolutionNotPowerOfTwo(usize),

    #[error("domain size must be within [{min}, {max}] meters, got {got}")]
    DomainSizeOutOfRange { got: f32, min: f32, max: f32 },

    #[error("choppiness must be within [0, {max}], got {got}")]
    ChoppinessOutOfRange { got: f32, max: f32 },

    #[error("time-lapse index {got} outside photograph sequence 1..={count}")]
    FrameIndexOutOfRange { got: f32, count: usize },
}
