//! Live camera and still-image QR code scanning.
//!
//! A [`Scanner`] ties together a [`CameraManager`](qrscan_camera::CameraManager),
//! a [`FrameExtractor`] sampling the video at a bounded rate, and a
//! [`DecodeWorker`](qrscan_decode::DecodeWorker) running the decode engine on
//! its own thread. [`QrScanner`] holds the entry points that need no
//! scanner: camera discovery and one-shot image decoding.
//!
//! ```no_run
//! # async fn demo<D, V>(devices: D, video: std::sync::Arc<V>)
//! # where D: qrscan_camera::MediaDevices, V: qrscan_camera::VideoElement<Stream = D::Stream> {
//! use qrscan::{Scanner, ScannerOptions};
//!
//! let mut scanner = Scanner::new(
//!     devices,
//!     video,
//!     qrscan::RqrrEngine::new(),
//!     |result| println!("{}", result.data),
//!     ScannerOptions::new().with_max_scans_per_second(10.0),
//! );
//! scanner.start().await.ok();
//! # }
//! ```

pub mod error;
pub mod frame_extractor;
pub mod options;
pub mod overlay;
pub mod qr_scanner;
pub mod scan_region;
pub mod scanner;

pub use error::{DecodeFailure, ScannerError};
pub use frame_extractor::{ExtractorConfig, FrameCallback, FrameExtractor, WorkerIdleHandle};
pub use options::{DecodeCallback, DecodeErrorCallback, ScannerOptions};
pub use overlay::{
    ObjectFit, OverlayConfig, OverlayError, OverlayShape, OverlaySurface, RenderedRect,
    ScanOverlay, map_corner_points, region_marker_size, rendered_video_rect,
};
pub use qr_scanner::QrScanner;
pub use scan_region::{ScanRegionFn, calculate_default_scan_region, default_scan_region_fn};
pub use scanner::{InversionMode, Scanner, ScannerState};

pub use qrscan_base::{FrameSample, Point, Region, ScanRegion, VideoDimensions};
pub use qrscan_decode::{
    DecodeEngine, DecoderOptions, DecoderOptionsPatch, ScanImageError, ScanImageOptions,
    ScanImageSource, ScanResult,
};

#[cfg(feature = "rqrr")]
pub use qrscan_decode::RqrrEngine;
