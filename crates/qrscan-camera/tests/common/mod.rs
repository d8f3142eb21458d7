#![allow(dead_code)]

use qrscan_base::{FrameSample, Region, VideoDimensions};
use qrscan_camera::{
    DeviceConstraint, DeviceInfo, FacingMode, MediaConstraints, MediaDevices, MediaError,
    MediaErrorKind, MediaStream, MediaTrack, ReadyState, TrackCapabilities, TrackSettings,
    VideoElement,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A scripted physical camera.
#[derive(Clone, Debug)]
pub struct MockCamera {
    pub id: String,
    pub label: String,
    pub facing: Option<FacingMode>,
    pub focus: Option<Vec<String>>,
    pub torch: Option<bool>,
}

impl MockCamera {
    pub fn new(id: &str, facing: Option<FacingMode>, focus: Option<&[&str]>) -> Self {
        Self {
            id: id.to_string(),
            label: String::new(),
            facing,
            focus: focus.map(|modes| modes.iter().map(|m| m.to_string()).collect()),
            torch: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_torch(mut self, torch: bool) -> Self {
        self.torch = Some(torch);
        self
    }
}

#[derive(Default)]
struct Inner {
    cameras: Vec<MockCamera>,
    calls: Vec<MediaConstraints>,
    opens: HashMap<String, usize>,
    stops: HashMap<String, usize>,
    fail_queue: VecDeque<MediaError>,
    fail_all: Option<MediaError>,
    fail_enumeration: bool,
    enumerations: usize,
}

#[derive(Clone, Default)]
pub struct MockDevices {
    inner: Arc<Mutex<Inner>>,
}

impl MockDevices {
    pub fn new(cameras: Vec<MockCamera>) -> Self {
        let devices = Self::default();
        devices.inner.lock().unwrap().cameras = cameras;
        devices
    }

    /// The next `get_user_media` calls fail with these errors, in order.
    pub fn fail_next(&self, errors: Vec<MediaError>) {
        self.inner.lock().unwrap().fail_queue.extend(errors);
    }

    pub fn fail_always(&self, error: MediaError) {
        self.inner.lock().unwrap().fail_all = Some(error);
    }

    pub fn fail_enumeration(&self) {
        self.inner.lock().unwrap().fail_enumeration = true;
    }

    pub fn calls(&self) -> Vec<MediaConstraints> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    pub fn opens(&self, id: &str) -> usize {
        *self.inner.lock().unwrap().opens.get(id).unwrap_or(&0)
    }

    pub fn stops(&self, id: &str) -> usize {
        *self.inner.lock().unwrap().stops.get(id).unwrap_or(&0)
    }

    pub fn enumerations(&self) -> usize {
        self.inner.lock().unwrap().enumerations
    }

    fn select(cameras: &[MockCamera], constraints: &MediaConstraints) -> Result<MockCamera, MediaError> {
        let camera = match &constraints.video.device {
            Some(DeviceConstraint::DeviceId(id)) => cameras
                .iter()
                .find(|c| &c.id == id)
                .ok_or_else(|| MediaError::new(MediaErrorKind::Overconstrained, "no such device"))?,
            Some(DeviceConstraint::FacingMode(mode)) => cameras
                .iter()
                .find(|c| c.facing == Some(*mode))
                .or_else(|| cameras.first())
                .ok_or_else(|| MediaError::new(MediaErrorKind::NotFound, "no camera"))?,
            None => cameras
                .first()
                .ok_or_else(|| MediaError::new(MediaErrorKind::NotFound, "no camera"))?,
        };
        Ok(camera.clone())
    }
}

impl MediaDevices for MockDevices {
    type Stream = MockStream;

    async fn get_user_media(&self, constraints: &MediaConstraints) -> Result<MockStream, MediaError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(constraints.clone());
        if let Some(err) = inner.fail_queue.pop_front() {
            return Err(err);
        }
        if let Some(err) = &inner.fail_all {
            return Err(err.clone());
        }
        let camera = Self::select(&inner.cameras, constraints)?;
        *inner.opens.entry(camera.id.clone()).or_default() += 1;
        Ok(MockStream {
            tracks: [MockTrack {
                camera,
                torch_on: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                devices: self.inner.clone(),
            }],
        })
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, MediaError> {
        let mut inner = self.inner.lock().unwrap();
        inner.enumerations += 1;
        if inner.fail_enumeration {
            return Err(MediaError::new(MediaErrorKind::Other, "enumeration blocked"));
        }
        Ok(inner
            .cameras
            .iter()
            .map(|c| DeviceInfo::video_input(c.id.clone(), c.label.clone()))
            .collect())
    }
}

pub struct MockTrack {
    camera: MockCamera,
    torch_on: AtomicBool,
    stopped: AtomicBool,
    devices: Arc<Mutex<Inner>>,
}

impl MediaTrack for MockTrack {
    fn settings(&self) -> TrackSettings {
        TrackSettings {
            device_id: Some(self.camera.id.clone()),
            facing_mode: self.camera.facing,
            width: Some(1920),
            height: Some(1080),
            torch: self.camera.torch.map(|_| self.torch_on.load(Ordering::SeqCst)),
        }
    }

    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities {
            torch: self.camera.torch,
            focus_mode: self.camera.focus.clone(),
        }
    }

    async fn apply_torch(&self, on: bool) -> Result<(), MediaError> {
        if self.camera.torch != Some(true) {
            return Err(MediaError::new(MediaErrorKind::Overconstrained, "torch"));
        }
        self.torch_on.store(on, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        // Count only the first stop of each opened track, like a real track
        // that is already ended.
        if !self.stopped.swap(true, Ordering::SeqCst) {
            let mut inner = self.devices.lock().unwrap();
            *inner.stops.entry(self.camera.id.clone()).or_default() += 1;
        }
    }
}

pub struct MockStream {
    tracks: [MockTrack; 1],
}

impl MockStream {
    pub fn device_id(&self) -> String {
        self.tracks[0].camera.id.clone()
    }
}

impl MediaStream for MockStream {
    type Track = MockTrack;

    fn tracks(&self) -> &[MockTrack] {
        &self.tracks
    }
}

#[derive(Default)]
pub struct MockVideo {
    attached: Mutex<Option<String>>,
    plays: Mutex<usize>,
    fail_play: AtomicBool,
}

impl MockVideo {
    pub fn attached(&self) -> Option<String> {
        self.attached.lock().unwrap().clone()
    }

    pub fn plays(&self) -> usize {
        *self.plays.lock().unwrap()
    }

    pub fn fail_play(&self) {
        self.fail_play.store(true, Ordering::SeqCst);
    }
}

impl VideoElement for MockVideo {
    type Stream = MockStream;

    fn attach(&self, stream: Option<&MockStream>) {
        *self.attached.lock().unwrap() = stream.map(|s| s.device_id());
    }

    async fn play(&self) -> Result<(), MediaError> {
        *self.plays.lock().unwrap() += 1;
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(MediaError::new(MediaErrorKind::Abort, "play interrupted"));
        }
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::HaveEnoughData
    }

    fn dimensions(&self) -> VideoDimensions {
        VideoDimensions::new(1920, 1080)
    }

    fn draw_region(&self, _region: Region, _surface: &mut FrameSample) {}
}
