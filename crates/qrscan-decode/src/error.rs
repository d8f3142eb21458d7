use std::fmt;

/// Failure reported by a decode engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Encoded bytes could not be turned into pixels.
    Image(String),
    /// Pixel buffer length does not match its dimensions.
    InvalidPixels { width: u32, height: u32, len: usize },
    Engine(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Image(msg) => write!(f, "image decode failed: {msg}"),
            DecodeError::InvalidPixels { width, height, len } => write!(
                f,
                "invalid pixel buffer: {len} bytes for {width}x{height} RGBA"
            ),
            DecodeError::Engine(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<crates_image::ImageError> for DecodeError {
    fn from(err: crates_image::ImageError) -> Self {
        DecodeError::Image(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker thread has exited or was terminated.
    Disconnected,
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Disconnected => write!(f, "decode worker disconnected"),
        }
    }
}

impl std::error::Error for WorkerError {}

#[derive(Debug)]
pub enum ScanImageError {
    /// The image decoded but holds no valid QR code.
    NoCodeFound,
    Decode(DecodeError),
    Io(std::io::Error),
    /// The URL could not be fetched, or answered with an error status.
    Fetch(reqwest::Error),
    UnsupportedUrl(String),
}

impl fmt::Display for ScanImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanImageError::NoCodeFound => write!(f, "No QR code found in the image"),
            ScanImageError::Decode(err) => write!(f, "{err}"),
            ScanImageError::Io(err) => write!(f, "io error: {err}"),
            ScanImageError::Fetch(err) => write!(f, "fetch failed: {err}"),
            ScanImageError::UnsupportedUrl(url) => write!(f, "unsupported url: {url}"),
        }
    }
}

impl std::error::Error for ScanImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanImageError::Decode(err) => Some(err),
            ScanImageError::Io(err) => Some(err),
            ScanImageError::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DecodeError> for ScanImageError {
    fn from(err: DecodeError) -> Self {
        ScanImageError::Decode(err)
    }
}

impl From<std::io::Error> for ScanImageError {
    fn from(err: std::io::Error) -> Self {
        ScanImageError::Io(err)
    }
}

impl From<crates_image::ImageError> for ScanImageError {
    fn from(err: crates_image::ImageError) -> Self {
        ScanImageError::Decode(err.into())
    }
}

impl From<reqwest::Error> for ScanImageError {
    fn from(err: reqwest::Error) -> Self {
        ScanImageError::Fetch(err)
    }
}
