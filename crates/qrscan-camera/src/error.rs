use std::fmt;

/// Classification of a media-layer failure, named after the DOM exceptions
/// `getUserMedia` rejects with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    NotAllowed,
    NotFound,
    NotReadable,
    Overconstrained,
    Abort,
    Other,
}

impl MediaErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediaErrorKind::NotAllowed => "NotAllowedError",
            MediaErrorKind::NotFound => "NotFoundError",
            MediaErrorKind::NotReadable => "NotReadableError",
            MediaErrorKind::Overconstrained => "OverconstrainedError",
            MediaErrorKind::Abort => "AbortError",
            MediaErrorKind::Other => "Error",
        }
    }
}

/// An error reported by a media backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaError {
    kind: MediaErrorKind,
    message: String,
}

impl MediaError {
    pub fn new(kind: MediaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> MediaErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for MediaError {}

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => MediaErrorKind::NotAllowed,
            std::io::ErrorKind::NotFound => MediaErrorKind::NotFound,
            _ => MediaErrorKind::NotReadable,
        };
        MediaError::new(kind, err.to_string())
    }
}

#[derive(Debug)]
pub enum CameraError {
    /// Camera access was denied. Never retried.
    Permission,
    /// No camera hardware. Never retried.
    NotFound,
    /// Every rung of the constraint ladder failed; carries the last failure.
    Acquisition(MediaError),
    /// The video element refused to play the stream.
    Playback(MediaError),
    /// Device enumeration failed.
    Enumeration(MediaError),
    FlashUnsupported,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Permission => write!(
                f,
                "Camera access denied. Please grant camera permission and try again."
            ),
            CameraError::NotFound => write!(
                f,
                "No camera found. Please connect a camera and try again."
            ),
            CameraError::Acquisition(err) => write!(f, "camera acquisition failed: {err}"),
            CameraError::Playback(err) => write!(f, "video playback failed: {err}"),
            CameraError::Enumeration(err) => write!(f, "device enumeration failed: {err}"),
            CameraError::FlashUnsupported => {
                write!(f, "Flash/torch is not supported on this device")
            }
        }
    }
}

impl std::error::Error for CameraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CameraError::Acquisition(err)
            | CameraError::Playback(err)
            | CameraError::Enumeration(err) => Some(err),
            _ => None,
        }
    }
}

impl CameraError {
    /// Classify a failed acquisition. Permission and absence errors are
    /// terminal, everything else is worth another rung of the ladder.
    pub fn from_acquisition(err: MediaError) -> Self {
        match err.kind() {
            MediaErrorKind::NotAllowed => CameraError::Permission,
            MediaErrorKind::NotFound => CameraError::NotFound,
            _ => CameraError::Acquisition(err),
        }
    }

    /// Whether the fallback ladder should continue after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, CameraError::Acquisition(_))
    }
}
