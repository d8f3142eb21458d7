use crate::{
    DeviceConstraint, DeviceInfo, MediaConstraints, MediaDevices, MediaError, MediaErrorKind,
    MediaStream, MediaTrack, ReadyState, TrackCapabilities, TrackSettings, VideoElement,
};
use qrscan_base::{FrameSample, Region, VideoDimensions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

/// V4L2 control id of "Focus, Automatic Continuous".
const CID_FOCUS_AUTO: u32 = 0x009a_090c;
/// V4L2 control id of "Focus, Absolute".
const CID_FOCUS_ABSOLUTE: u32 = 0x009a_090a;

const BUFFER_COUNT: u32 = 4;

type LatestFrame = Arc<Mutex<Option<FrameSample>>>;

/// Linux capture devices under `/dev/video*`.
///
/// Device ids are device node paths. V4L2 has no notion of facing mode, so a
/// facing-mode constraint opens the first capture device.
#[derive(Debug, Default, Clone, Copy)]
pub struct V4l2Devices;

impl V4l2Devices {
    fn capture_nodes() -> Vec<(String, String)> {
        v4l::context::enum_devices()
            .into_iter()
            .filter_map(|node| {
                let path = node.path().to_string_lossy().into_owned();
                let device = Device::with_path(node.path()).ok()?;
                let caps = device.query_caps().ok()?;
                if !caps
                    .capabilities
                    .contains(v4l::capability::Flags::VIDEO_CAPTURE)
                {
                    return None;
                }
                Some((path, node.name().unwrap_or_default()))
            })
            .collect()
    }
}

impl MediaDevices for V4l2Devices {
    type Stream = V4l2Stream;

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<V4l2Stream, MediaError> {
        let path = match &constraints.video.device {
            Some(DeviceConstraint::DeviceId(id)) => id.clone(),
            Some(DeviceConstraint::FacingMode(_)) | None => Self::capture_nodes()
                .into_iter()
                .next()
                .map(|(path, _)| path)
                .ok_or_else(|| MediaError::new(MediaErrorKind::NotFound, "no capture device"))?,
        };
        let width = constraints
            .video
            .width
            .map(|c| match c {
                crate::ConstraintValue::Ideal(v) | crate::ConstraintValue::Exact(v) => v,
            })
            .unwrap_or(640);
        let height = constraints
            .video
            .height
            .map(|c| match c {
                crate::ConstraintValue::Ideal(v) | crate::ConstraintValue::Exact(v) => v,
            })
            .unwrap_or(480);
        V4l2Stream::open(&path, width, height)
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, MediaError> {
        Ok(Self::capture_nodes()
            .into_iter()
            .map(|(path, name)| DeviceInfo::video_input(path, name))
            .collect())
    }
}

/// The single video track of a [`V4l2Stream`].
pub struct V4l2Track {
    device_id: String,
    width: u32,
    height: u32,
    focus_mode: Option<Vec<String>>,
    running: Arc<AtomicBool>,
}

impl std::fmt::Debug for V4l2Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Track")
            .field("device_id", &self.device_id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("running", &self.running.load(Ordering::Relaxed))
            .finish()
    }
}

impl MediaTrack for V4l2Track {
    fn settings(&self) -> TrackSettings {
        TrackSettings {
            device_id: Some(self.device_id.clone()),
            facing_mode: None,
            width: Some(self.width),
            height: Some(self.height),
            torch: None,
        }
    }

    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities {
            torch: None,
            focus_mode: self.focus_mode.clone(),
        }
    }

    async fn apply_torch(&self, _on: bool) -> Result<(), MediaError> {
        Err(MediaError::new(
            MediaErrorKind::Overconstrained,
            "V4L2 devices have no torch control",
        ))
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// A capture thread publishing the most recent frame as RGBA.
pub struct V4l2Stream {
    tracks: [V4l2Track; 1],
    latest: LatestFrame,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Stream")
            .field("track", &self.tracks[0])
            .field("thread_handle", &self.thread_handle.is_some())
            .finish()
    }
}

impl MediaStream for V4l2Stream {
    type Track = V4l2Track;

    fn tracks(&self) -> &[V4l2Track] {
        &self.tracks
    }
}

impl Drop for V4l2Stream {
    fn drop(&mut self) {
        self.stop_all();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl V4l2Stream {
    /// Open `path` for MJPEG capture at the requested resolution and start
    /// the capture thread.
    pub fn open(path: &str, width: u32, height: u32) -> Result<Self, MediaError> {
        let device = Device::with_path(path)?;

        let mut format = Format::new(width, height, FourCC::new(b"MJPG"));
        format = Capture::set_format(&device, &format)?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(MediaError::new(
                MediaErrorKind::Overconstrained,
                "MJPEG format not supported by device",
            ));
        }

        let focus_mode = device.query_controls().ok().and_then(|controls| {
            let has_auto = controls.iter().any(|c| c.id == CID_FOCUS_AUTO);
            let has_manual = controls.iter().any(|c| c.id == CID_FOCUS_ABSOLUTE);
            match (has_auto, has_manual) {
                (false, false) => None,
                (true, _) => Some(vec!["manual".to_string(), "continuous".to_string()]),
                (false, true) => Some(vec!["manual".to_string()]),
            }
        });

        let running = Arc::new(AtomicBool::new(true));
        let latest: LatestFrame = Arc::new(Mutex::new(None));

        let thread_running = running.clone();
        let thread_latest = latest.clone();
        let thread_path = path.to_string();
        let handle = thread::spawn(move || {
            if let Err(e) = Self::capture_loop(device, thread_running, thread_latest) {
                log::error!("capture thread for {} failed: {}", thread_path, e);
            }
        });

        Ok(Self {
            tracks: [V4l2Track {
                device_id: path.to_string(),
                width: format.width,
                height: format.height,
                focus_mode,
                running,
            }],
            latest,
            thread_handle: Some(handle),
        })
    }

    /// Reads frames until the track is stopped, decoding MJPEG into the
    /// shared latest-frame slot.
    fn capture_loop(
        device: Device,
        running: Arc<AtomicBool>,
        latest: LatestFrame,
    ) -> Result<(), MediaError> {
        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)?;

        while running.load(Ordering::Relaxed) {
            let (frame_data, _metadata) = CaptureStream::next(&mut stream)?;

            let decoded = match crates_image::load_from_memory(frame_data) {
                Ok(img) => img.to_rgba8(),
                Err(e) => {
                    log::debug!("dropping undecodable frame: {}", e);
                    continue;
                }
            };
            let (width, height) = decoded.dimensions();
            let Some(sample) = FrameSample::from_rgba(width, height, decoded.into_raw()) else {
                continue;
            };

            *latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(sample);
        }

        Ok(())
    }
}

/// A video element stand-in that shows the latest frame of a [`V4l2Stream`].
#[derive(Default)]
pub struct V4l2Video {
    source: Mutex<Option<LatestFrame>>,
}

impl V4l2Video {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_frame<R>(&self, f: impl FnOnce(&FrameSample) -> R) -> Option<R> {
        let source = self.source.lock().unwrap_or_else(|e| e.into_inner());
        let latest = source.as_ref()?.lock().unwrap_or_else(|e| e.into_inner());
        latest.as_ref().map(f)
    }
}

impl VideoElement for V4l2Video {
    type Stream = V4l2Stream;

    fn attach(&self, stream: Option<&V4l2Stream>) {
        *self.source.lock().unwrap_or_else(|e| e.into_inner()) =
            stream.map(|s| s.latest.clone());
    }

    async fn play(&self) -> Result<(), MediaError> {
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        self.with_frame(|_| ReadyState::HaveEnoughData)
            .unwrap_or(ReadyState::HaveNothing)
    }

    fn dimensions(&self) -> VideoDimensions {
        self.with_frame(|frame| VideoDimensions::new(frame.width(), frame.height()))
            .unwrap_or_default()
    }

    fn draw_region(&self, region: Region, surface: &mut FrameSample) {
        self.with_frame(|frame| frame.crop_into(region, surface));
    }
}
