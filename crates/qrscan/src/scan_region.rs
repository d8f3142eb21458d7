use qrscan_base::{ScanRegion, VideoDimensions};
use std::sync::Arc;

/// Computes the region to decode from the current video dimensions.
pub type ScanRegionFn = Arc<dyn Fn(&VideoDimensions) -> ScanRegion + Send + Sync>;

/// A centered square of two thirds of the smaller video dimension.
///
/// Uses the live stream size, falling back per axis to the element's own
/// size while the stream has not reported one.
pub fn calculate_default_scan_region(dims: &VideoDimensions) -> ScanRegion {
    let (width, height) = dims.effective();
    let size = (2.0 / 3.0 * width.min(height) as f64).round();
    let x = ((width as f64 - size) / 2.0).round();
    let y = ((height as f64 - size) / 2.0).round();
    ScanRegion::new(x as u32, y as u32, size as u32, size as u32)
}

pub fn default_scan_region_fn() -> ScanRegionFn {
    Arc::new(calculate_default_scan_region)
}
