#![allow(dead_code)]

use qrscan::{ObjectFit, OverlayShape, OverlaySurface};
use qrscan_base::{FrameSample, Point, Region, VideoDimensions};
use qrscan_camera::{
    DeviceInfo, MediaConstraints, MediaDevices, MediaError, MediaErrorKind, MediaStream,
    MediaTrack, ReadyState, TrackCapabilities, TrackSettings, VideoElement,
};
use qrscan_decode::{
    BarcodeFormat, DecodeEngine, DecodeError, DecoderOptions, DetectedSymbol, ImageInput, Position,
};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// --- Camera ---

#[derive(Default)]
struct DevicesInner {
    ids: Vec<String>,
    fail: Option<MediaError>,
    calls: usize,
    stops: usize,
}

/// A set of rear cameras that report neither facing mode nor focus.
#[derive(Clone, Default)]
pub struct MockDevices {
    inner: Arc<Mutex<DevicesInner>>,
}

impl MockDevices {
    pub fn new(ids: &[&str]) -> Self {
        let devices = Self::default();
        devices.inner.lock().unwrap().ids = ids.iter().map(|s| s.to_string()).collect();
        devices
    }

    pub fn fail_with(&self, kind: MediaErrorKind) {
        self.inner.lock().unwrap().fail = Some(MediaError::new(kind, "scripted"));
    }

    pub fn heal(&self) {
        self.inner.lock().unwrap().fail = None;
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    pub fn stops(&self) -> usize {
        self.inner.lock().unwrap().stops
    }
}

impl MediaDevices for MockDevices {
    type Stream = MockStream;

    async fn get_user_media(&self, constraints: &MediaConstraints) -> Result<MockStream, MediaError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        if let Some(err) = &inner.fail {
            return Err(err.clone());
        }
        let id = match constraints.exact_device_id() {
            Some(id) if inner.ids.iter().any(|i| i == id) => id.to_string(),
            Some(_) => return Err(MediaError::new(MediaErrorKind::Overconstrained, "deviceId")),
            None => inner
                .ids
                .first()
                .cloned()
                .ok_or_else(|| MediaError::new(MediaErrorKind::NotFound, "no camera"))?,
        };
        Ok(MockStream {
            tracks: [MockTrack {
                id,
                torch: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                devices: self.inner.clone(),
            }],
        })
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, MediaError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ids
            .iter()
            .map(|id| DeviceInfo::video_input(id.clone(), ""))
            .collect())
    }
}

pub struct MockTrack {
    id: String,
    torch: AtomicBool,
    stopped: AtomicBool,
    devices: Arc<Mutex<DevicesInner>>,
}

impl MediaTrack for MockTrack {
    fn settings(&self) -> TrackSettings {
        TrackSettings {
            device_id: Some(self.id.clone()),
            torch: Some(self.torch.load(Ordering::SeqCst)),
            ..Default::default()
        }
    }

    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities {
            torch: Some(true),
            focus_mode: None,
        }
    }

    async fn apply_torch(&self, on: bool) -> Result<(), MediaError> {
        self.torch.store(on, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.devices.lock().unwrap().stops += 1;
        }
    }
}

pub struct MockStream {
    tracks: [MockTrack; 1],
}

impl MockStream {
    pub fn device_id(&self) -> String {
        self.tracks[0].id.clone()
    }
}

impl MediaStream for MockStream {
    type Track = MockTrack;

    fn tracks(&self) -> &[MockTrack] {
        &self.tracks
    }
}

// --- Video ---

/// A video element showing a solid gray frame.
pub struct MockVideo {
    ready: Mutex<ReadyState>,
    dims: Mutex<VideoDimensions>,
    attached: Mutex<Option<String>>,
    draws: Mutex<Vec<Region>>,
    draw_times: Mutex<Vec<Instant>>,
}

impl MockVideo {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ready: Mutex::new(ReadyState::HaveEnoughData),
            dims: Mutex::new(VideoDimensions::new(width, height)),
            attached: Mutex::new(None),
            draws: Mutex::new(Vec::new()),
            draw_times: Mutex::new(Vec::new()),
        }
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        *self.ready.lock().unwrap() = state;
    }

    pub fn set_dimensions(&self, dims: VideoDimensions) {
        *self.dims.lock().unwrap() = dims;
    }

    pub fn attached(&self) -> Option<String> {
        self.attached.lock().unwrap().clone()
    }

    pub fn draws(&self) -> Vec<Region> {
        self.draws.lock().unwrap().clone()
    }

    /// When each frame was sampled.
    pub fn draw_times(&self) -> Vec<Instant> {
        self.draw_times.lock().unwrap().clone()
    }

    pub fn draw_count(&self) -> usize {
        self.draws.lock().unwrap().len()
    }
}

impl VideoElement for MockVideo {
    type Stream = MockStream;

    fn attach(&self, stream: Option<&MockStream>) {
        *self.attached.lock().unwrap() = stream.map(|s| s.device_id());
    }

    async fn play(&self) -> Result<(), MediaError> {
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready.lock().unwrap()
    }

    fn dimensions(&self) -> VideoDimensions {
        *self.dims.lock().unwrap()
    }

    fn draw_region(&self, region: Region, surface: &mut FrameSample) {
        self.draws.lock().unwrap().push(region);
        self.draw_times.lock().unwrap().push(Instant::now());
        surface.resize(region.width, region.height);
        surface.data_mut().fill(128);
    }
}

// --- Engine ---

pub enum Outcome {
    Symbols(Vec<DetectedSymbol>),
    Fail(String),
}

/// A scripted engine. Once the script runs out every call finds nothing.
#[derive(Clone, Default)]
pub struct StubEngine {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    calls: Arc<Mutex<Vec<((u32, u32), DecoderOptions)>>>,
    spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
    delay: Option<Duration>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, outcome: Outcome) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    /// Block the worker thread this long per frame.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<((u32, u32), DecoderOptions)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Start and end of every decode, in call order.
    pub fn spans(&self) -> Vec<(Instant, Instant)> {
        self.spans.lock().unwrap().clone()
    }
}

impl DecodeEngine for StubEngine {
    fn read_barcodes(
        &mut self,
        input: ImageInput,
        options: &DecoderOptions,
    ) -> Result<Vec<DetectedSymbol>, DecodeError> {
        let size = match &input {
            ImageInput::Pixels(sample) => (sample.width(), sample.height()),
            ImageInput::Encoded(_) => (0, 0),
        };
        let started = Instant::now();
        self.calls.lock().unwrap().push((size, options.clone()));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.spans.lock().unwrap().push((started, Instant::now()));
        let outcome = self.script.lock().unwrap().pop_front();
        match outcome {
            None => Ok(Vec::new()),
            Some(Outcome::Symbols(symbols)) => Ok(symbols),
            Some(Outcome::Fail(msg)) => Err(DecodeError::Engine(msg)),
        }
    }
}

pub fn symbol(text: &str) -> DetectedSymbol {
    DetectedSymbol {
        text: text.to_string(),
        is_valid: true,
        format: BarcodeFormat::QrCode,
        position: Position {
            top_left: Point::new(10.0, 10.0),
            top_right: Point::new(90.0, 10.0),
            bottom_left: Point::new(10.0, 90.0),
            bottom_right: Point::new(90.0, 90.0),
        },
    }
}

// --- Overlay ---

#[derive(Clone)]
pub struct MockOverlay {
    pub container: Option<(f32, f32)>,
    pub element: (f32, f32),
    pub fit: ObjectFit,
    pub shapes: Arc<Mutex<Vec<OverlayShape>>>,
    pub clears: Arc<AtomicUsize>,
}

impl MockOverlay {
    pub fn new(container: Option<(f32, f32)>) -> Self {
        Self {
            container,
            element: container.unwrap_or((0.0, 0.0)),
            fit: ObjectFit::Fill,
            shapes: Arc::new(Mutex::new(Vec::new())),
            clears: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn shapes(&self) -> Vec<OverlayShape> {
        self.shapes.lock().unwrap().clone()
    }
}

impl OverlaySurface for MockOverlay {
    fn container_size(&self) -> Option<(f32, f32)> {
        self.container
    }

    fn element_size(&self) -> (f32, f32) {
        self.element
    }

    fn object_fit(&self) -> ObjectFit {
        self.fit
    }

    fn draw(&mut self, shape: OverlayShape) {
        self.shapes.lock().unwrap().push(shape);
    }

    fn clear(&mut self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

// --- Helpers ---

/// Poll `check` every few milliseconds until it holds or two seconds pass.
pub async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

/// Run `fut` and give spawned tasks a moment to settle.
pub async fn settle<F: Future>(fut: F) -> F::Output {
    let out = fut.await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    out
}
