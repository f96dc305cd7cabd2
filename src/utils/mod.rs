//! Utility modules for near_kpiece

pub mod visualization;

pub use visualization::{colors, PathStyle, PointStyle, Visualizer};
