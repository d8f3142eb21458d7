//! Camera acquisition for qrscan.
//!
//! [`CameraManager`] owns at most one live camera stream. It acquires the
//! stream through a [`MediaDevices`] implementation using a fallback ladder of
//! constraints, swaps to a better physical camera when the first choice lacks
//! continuous autofocus, and exposes torch control. Backends implement the
//! traits in [`media`] and [`video`].

pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod media;
pub mod slot;
pub mod video;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use cache::{DeviceIdCache, FileDeviceIdCache, MemoryDeviceIdCache, NoDeviceIdCache};
pub use config::{CameraConfig, Resolution};
pub use error::{CameraError, MediaError, MediaErrorKind};
pub use manager::{CameraInfo, CameraManager};
pub use media::{
    CameraSelector, ConstraintValue, DeviceConstraint, DeviceInfo, DeviceKind, FacingMode,
    MediaConstraints, MediaDevices, MediaStream, MediaTrack, TrackCapabilities, TrackSettings,
    VideoConstraints,
};
pub use slot::ActiveStream;
pub use video::{ReadyState, VideoElement};

#[cfg(feature = "v4l2")]
pub use v4l2::{V4l2Devices, V4l2Stream, V4l2Track, V4l2Video};
