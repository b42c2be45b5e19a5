//! GPU-ready particle buffers
//!
//! The host renderer draws every particle layer as instanced point
//! sprites. This module packs the simulation pools into flat instance
//! arrays it can upload as-is.

pub mod instance;

pub use instance::{ParticleBuffers, PointInstance};
