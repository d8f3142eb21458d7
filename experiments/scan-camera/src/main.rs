use qrscan::{QrScanner, RqrrEngine, Scanner, ScannerOptions};
use qrscan_base::log;
use qrscan_camera::{FacingMode, V4l2Devices, V4l2Video};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_SECONDS: u64 = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    qrscan_base::init_stdout_logger();
    QrScanner::set_debug(true);

    // scan-camera [device] [seconds]
    let device = std::env::args().nth(1);
    let seconds = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let devices = V4l2Devices;
    for camera in QrScanner::list_cameras(&devices, false).await? {
        log::info!("camera {}: {}", camera.id, camera.label);
    }

    let mut options = ScannerOptions::new()
        .with_max_scans_per_second(10.0)
        .with_on_decode_error(|e| log::debug!("{}", e));
    options = match device {
        Some(path) => options.with_preferred_camera(path),
        None => options.with_preferred_camera(FacingMode::Environment),
    };

    let mut scanner = Scanner::new(
        devices,
        Arc::new(V4l2Video::new()),
        RqrrEngine::new(),
        |result| log::info!("decoded: {}", result.data),
        options,
    );
    scanner.start().await?;
    log::info!("scanning for {}s", seconds);

    tokio::time::sleep(Duration::from_secs(seconds)).await;

    scanner.destroy();
    log::info!("done");
    Ok(())
}
