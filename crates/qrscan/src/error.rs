use qrscan_camera::CameraError;
use std::fmt;

#[derive(Debug)]
pub enum ScannerError {
    /// The scanner was destroyed and cannot be restarted.
    Destroyed,
    Camera(CameraError),
}

impl fmt::Display for ScannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerError::Destroyed => write!(f, "Scanner has been destroyed"),
            ScannerError::Camera(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ScannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScannerError::Camera(err) => Some(err),
            ScannerError::Destroyed => None,
        }
    }
}

impl From<CameraError> for ScannerError {
    fn from(err: CameraError) -> Self {
        ScannerError::Camera(err)
    }
}

/// Why a sampled frame produced no result. Reported through the scanner's
/// decode-error callback, never as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// The engine failed on the frame.
    Engine(String),
    NoCodeFound,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFailure::Engine(msg) => write!(f, "{msg}"),
            DecodeFailure::NoCodeFound => write!(f, "No QR code found"),
        }
    }
}

impl std::error::Error for DecodeFailure {}
