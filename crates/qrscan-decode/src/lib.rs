//! QR decoding for qrscan.
//!
//! The decoding algorithm itself sits behind [`DecodeEngine`]. This crate
//! provides the option set engines are driven with, the [`DecodeWorker`]
//! that runs an engine on its own thread, and [`scan_image`] for one-shot
//! decoding of still images. The `rqrr` feature (on by default) adds
//! [`RqrrEngine`].

pub mod engine;
pub mod error;
pub mod options;
pub mod scan_image;
pub mod worker;

#[cfg(feature = "rqrr")]
pub mod rqrr_engine;

pub use engine::{DecodeEngine, DetectedSymbol, ImageInput, Position, ScanResult, valid_results};
pub use error::{DecodeError, ScanImageError, WorkerError};
pub use options::{BarcodeFormat, DecoderOptions, DecoderOptionsPatch};
pub use scan_image::{ScanImageOptions, ScanImageSource, scan_image};
pub use worker::{DecodeWorker, WorkerHandle, WorkerRequest, WorkerResponse};

#[cfg(feature = "rqrr")]
pub use rqrr_engine::RqrrEngine;

// Re-exported so callers can build `ScanImageSource::Image` values.
pub use crates_image;
