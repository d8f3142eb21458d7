use crate::{DecodeFailure, OverlaySurface, ScanRegionFn};
use qrscan_base::{ScanRegion, VideoDimensions};
use qrscan_camera::{CameraSelector, DeviceIdCache, Resolution};
use qrscan_decode::{DecoderOptionsPatch, ScanResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub type DecodeCallback = Arc<dyn Fn(ScanResult) + Send + Sync>;
pub type DecodeErrorCallback = Arc<dyn Fn(DecodeFailure) + Send + Sync>;

/// Caller options for a [`Scanner`](crate::Scanner).
pub struct ScannerOptions {
    on_decode_error: Option<DecodeErrorCallback>,
    calculate_scan_region: Option<ScanRegionFn>,
    preferred_camera: CameraSelector,
    max_scans_per_second: f64,
    highlight_scan_region: bool,
    highlight_code_outline: bool,
    overlay: Option<Box<dyn OverlaySurface>>,
    camera_resolution: Resolution,
    decoder_options: Option<DecoderOptionsPatch>,
    device_cache: Option<Arc<dyn DeviceIdCache>>,
    display_refresh: Duration,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            on_decode_error: None,
            calculate_scan_region: None,
            preferred_camera: CameraSelector::default(),
            max_scans_per_second: 15.0,
            highlight_scan_region: false,
            highlight_code_outline: false,
            overlay: None,
            camera_resolution: Resolution::default(),
            decoder_options: None,
            device_cache: None,
            display_refresh: Duration::from_micros(16_667),
        }
    }
}

impl fmt::Debug for ScannerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerOptions")
            .field("on_decode_error", &self.on_decode_error.is_some())
            .field("calculate_scan_region", &self.calculate_scan_region.is_some())
            .field("preferred_camera", &self.preferred_camera)
            .field("max_scans_per_second", &self.max_scans_per_second)
            .field("highlight_scan_region", &self.highlight_scan_region)
            .field("highlight_code_outline", &self.highlight_code_outline)
            .field("overlay", &self.overlay.is_some())
            .field("camera_resolution", &self.camera_resolution)
            .field("decoder_options", &self.decoder_options)
            .field("device_cache", &self.device_cache.is_some())
            .field("display_refresh", &self.display_refresh)
            .finish()
    }
}

impl ScannerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a frame yields no code or the engine fails on it.
    pub fn with_on_decode_error(mut self, f: impl Fn(DecodeFailure) + Send + Sync + 'static) -> Self {
        self.on_decode_error = Some(Arc::new(f));
        self
    }

    /// Replace the default centered-square scan region.
    pub fn with_calculate_scan_region(
        mut self,
        f: impl Fn(&VideoDimensions) -> ScanRegion + Send + Sync + 'static,
    ) -> Self {
        self.calculate_scan_region = Some(Arc::new(f));
        self
    }

    pub fn with_preferred_camera(mut self, selector: impl Into<CameraSelector>) -> Self {
        self.preferred_camera = selector.into();
        self
    }

    pub fn with_max_scans_per_second(mut self, rate: f64) -> Self {
        self.max_scans_per_second = rate;
        self
    }

    pub fn with_highlight_scan_region(mut self, on: bool) -> Self {
        self.highlight_scan_region = on;
        self
    }

    pub fn with_highlight_code_outline(mut self, on: bool) -> Self {
        self.highlight_code_outline = on;
        self
    }

    /// Surface to draw highlights on. Without any highlight flag it is
    /// treated as the caller's own overlay and only stretched full-size.
    pub fn with_overlay(mut self, surface: impl OverlaySurface + 'static) -> Self {
        self.overlay = Some(Box::new(surface));
        self
    }

    pub fn with_camera_resolution(mut self, resolution: Resolution) -> Self {
        self.camera_resolution = resolution;
        self
    }

    /// Sent to the decode worker right after it starts.
    pub fn with_decoder_options(mut self, patch: DecoderOptionsPatch) -> Self {
        self.decoder_options = Some(patch);
        self
    }

    /// Where the last good camera per facing mode is remembered. Defaults to
    /// a JSON file in the user cache directory.
    pub fn with_device_cache(mut self, cache: Arc<dyn DeviceIdCache>) -> Self {
        self.device_cache = Some(cache);
        self
    }

    /// Period of the sampling tick.
    pub fn with_display_refresh(mut self, period: Duration) -> Self {
        self.display_refresh = period;
        self
    }

    pub fn preferred_camera(&self) -> &CameraSelector {
        &self.preferred_camera
    }

    pub fn max_scans_per_second(&self) -> f64 {
        self.max_scans_per_second
    }

    pub fn highlight_scan_region(&self) -> bool {
        self.highlight_scan_region
    }

    pub fn highlight_code_outline(&self) -> bool {
        self.highlight_code_outline
    }

    pub fn camera_resolution(&self) -> Resolution {
        self.camera_resolution
    }

    pub fn decoder_options(&self) -> Option<&DecoderOptionsPatch> {
        self.decoder_options.as_ref()
    }

    pub fn display_refresh(&self) -> Duration {
        self.display_refresh
    }

    pub(crate) fn on_decode_error(&self) -> Option<DecodeErrorCallback> {
        self.on_decode_error.clone()
    }

    pub(crate) fn scan_region_fn(&self) -> Option<ScanRegionFn> {
        self.calculate_scan_region.clone()
    }

    pub(crate) fn take_overlay(&mut self) -> Option<Box<dyn OverlaySurface>> {
        self.overlay.take()
    }

    pub(crate) fn take_device_cache(&mut self) -> Option<Arc<dyn DeviceIdCache>> {
        self.device_cache.take()
    }
}
