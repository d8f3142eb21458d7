use qrscan_base::FrameSample;
use qrscan_camera::{CameraError, CameraInfo, CameraManager, MediaDevices};
use qrscan_decode::{DecodeEngine, ScanImageError, ScanImageOptions, ScanImageSource, ScanResult};

/// Entry points that need no running scanner.
#[derive(Debug, Clone, Copy)]
pub struct QrScanner;

impl QrScanner {
    /// Whether the device has at least one camera.
    pub async fn has_camera<D: MediaDevices>(devices: &D) -> bool {
        CameraManager::has_camera(devices).await
    }

    /// List cameras. `request_labels` opens and closes a stream first so the
    /// platform reveals device labels.
    pub async fn list_cameras<D: MediaDevices>(
        devices: &D,
        request_labels: bool,
    ) -> Result<Vec<CameraInfo>, CameraError> {
        CameraManager::list_cameras(devices, request_labels).await
    }

    /// Decode a single still image.
    pub async fn scan_image<E: DecodeEngine + ?Sized>(
        engine: &mut E,
        source: impl Into<ScanImageSource>,
        options: &ScanImageOptions,
    ) -> Result<ScanResult, ScanImageError> {
        qrscan_decode::scan_image(engine, source, options).await
    }

    /// Warm up `engine` so the first real scan is not slowed by one-time
    /// initialization.
    pub async fn preload<E: DecodeEngine + ?Sized>(engine: &mut E) {
        let mut pixel = FrameSample::new(1, 1);
        pixel.data_mut().fill(255);
        match qrscan_decode::scan_image(engine, pixel, &ScanImageOptions::default()).await {
            Err(ScanImageError::NoCodeFound) => {}
            Ok(_) => log::debug!("preload image unexpectedly held a code"),
            Err(e) => log::debug!("preload scan failed: {}", e),
        }
    }

    /// Turn debug logging (timings, camera selection) on or off.
    pub fn set_debug(enabled: bool) {
        qrscan_base::set_debug(enabled);
    }
}
