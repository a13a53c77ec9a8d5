//! Ground-track speed estimation for an orbiting camera platform.
//!
//! Two sequential nadir photographs are matched feature-to-feature, the
//! median pixel displacement is converted to a ground distance from the
//! camera/orbit geometry, and the elapsed time between the capture
//! timestamps turns that into a speed.

pub mod camera;
pub mod config;
pub mod data_loader;
pub mod ephemeris;
pub mod error;
pub mod features;
pub mod filter;
pub mod geometry;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod speed;
