use crate::MediaError;
use std::fmt;
use std::str::FromStr;

/// Which side of the device a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacingMode {
    /// Rear camera.
    Environment,
    /// Front camera.
    User,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "environment" => Ok(FacingMode::Environment),
            "user" => Ok(FacingMode::User),
            _ => Err(()),
        }
    }
}

/// A camera choice: either a symbolic facing mode or a pinned device id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSelector {
    Facing(FacingMode),
    Device(String),
}

impl CameraSelector {
    pub fn facing_mode(&self) -> Option<FacingMode> {
        match self {
            CameraSelector::Facing(mode) => Some(*mode),
            CameraSelector::Device(_) => None,
        }
    }
}

impl Default for CameraSelector {
    fn default() -> Self {
        CameraSelector::Facing(FacingMode::Environment)
    }
}

impl From<FacingMode> for CameraSelector {
    fn from(mode: FacingMode) -> Self {
        CameraSelector::Facing(mode)
    }
}

/// `"environment"` and `"user"` select a facing mode, anything else is taken
/// as a device id.
impl From<&str> for CameraSelector {
    fn from(s: &str) -> Self {
        match s.parse::<FacingMode>() {
            Ok(mode) => CameraSelector::Facing(mode),
            Err(()) => CameraSelector::Device(s.to_string()),
        }
    }
}

impl From<String> for CameraSelector {
    fn from(s: String) -> Self {
        CameraSelector::from(s.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintValue {
    Ideal(u32),
    Exact(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceConstraint {
    FacingMode(FacingMode),
    /// Always matched exactly.
    DeviceId(String),
}

/// Video track constraints. All `None` means "any camera".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoConstraints {
    pub device: Option<DeviceConstraint>,
    pub width: Option<ConstraintValue>,
    pub height: Option<ConstraintValue>,
}

/// Constraints for a stream request. Audio is never requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
}

impl MediaConstraints {
    /// The bare `{video: true}` request.
    pub fn any_video() -> Self {
        Self::default()
    }

    pub fn is_bare(&self) -> bool {
        self.video == VideoConstraints::default()
    }

    pub fn exact_device_id(&self) -> Option<&str> {
        match &self.video.device {
            Some(DeviceConstraint::DeviceId(id)) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// One entry of a device enumeration. `label` is empty until the user has
/// granted camera permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    pub label: String,
}

impl DeviceInfo {
    pub fn video_input(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kind: DeviceKind::VideoInput,
            label: label.into(),
        }
    }
}

/// Current settings of a track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSettings {
    pub device_id: Option<String>,
    pub facing_mode: Option<FacingMode>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub torch: Option<bool>,
}

/// What a track can do. `None` means the backend does not report it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackCapabilities {
    pub torch: Option<bool>,
    pub focus_mode: Option<Vec<String>>,
}

impl TrackCapabilities {
    pub fn has_continuous_focus(&self) -> bool {
        self.focus_mode
            .as_ref()
            .is_some_and(|modes| modes.iter().any(|m| m == "continuous"))
    }
}

/// A single video track of a live stream.
#[allow(async_fn_in_trait)]
pub trait MediaTrack: Send + Sync {
    fn settings(&self) -> TrackSettings;

    fn capabilities(&self) -> TrackCapabilities;

    /// Apply a torch constraint. Fails if the track has no torch.
    async fn apply_torch(&self, on: bool) -> Result<(), MediaError>;

    /// Stop the track and release the device. Safe to call repeatedly.
    fn stop(&self);
}

/// A live camera stream.
pub trait MediaStream: Send + Sync + 'static {
    type Track: MediaTrack;

    fn tracks(&self) -> &[Self::Track];

    fn video_track(&self) -> Option<&Self::Track> {
        self.tracks().first()
    }

    fn stop_all(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }
}

/// Access to the platform's cameras.
#[allow(async_fn_in_trait)]
pub trait MediaDevices {
    type Stream: MediaStream;

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Self::Stream, MediaError>;

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, MediaError>;
}
