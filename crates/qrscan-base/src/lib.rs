//! Shared types for the qrscan crates.
//!
//! Geometry in video-pixel coordinates, the RGBA frame buffer handed from the
//! frame extractor to the decoder, and the logger used by the binaries.

pub mod frame;
pub mod geometry;
pub mod logging;

pub use frame::FrameSample;
pub use geometry::{Point, Region, ScanRegion, VideoDimensions};
pub use logging::{init_stdout_logger, is_debug, set_debug, StdoutLogger};

// Re-export log crate so downstream crates can use qrscan_base::log::*
pub use log;
