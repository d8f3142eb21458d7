use crate::{
    DecodeCallback, DecodeErrorCallback, DecodeFailure, ExtractorConfig, FrameExtractor,
    OverlayConfig, ScanOverlay, ScanRegionFn, ScannerError, ScannerOptions,
    default_scan_region_fn,
};
use qrscan_base::{Region, VideoDimensions};
use qrscan_camera::{CameraConfig, CameraManager, CameraSelector, MediaDevices, VideoElement};
use qrscan_decode::{
    DecodeEngine, DecodeWorker, DecoderOptions, DecoderOptionsPatch, ScanResult, WorkerResponse,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Active,
    Paused,
    /// Terminal.
    Destroyed,
}

/// Which code polarity the decoder looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InversionMode {
    /// Dark on light only.
    Original,
    /// Light on dark as well.
    Invert,
    Both,
}

impl InversionMode {
    pub fn try_invert(&self) -> bool {
        !matches!(self, InversionMode::Original)
    }
}

type SharedOverlay = Arc<Mutex<Option<ScanOverlay>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn current_region<V: VideoElement>(video: &V, scan_region: &ScanRegionFn) -> (Region, VideoDimensions) {
    let dims = video.dimensions();
    let region = scan_region(&dims).resolve(dims.video_width, dims.video_height);
    (region, dims)
}

/// Live QR scanning from a camera.
///
/// Frames are sampled from `video`, cropped to the scan region and decoded on
/// a worker thread; every decoded code is passed to the decode callback.
pub struct Scanner<D, V>
where
    D: MediaDevices,
    V: VideoElement<Stream = D::Stream>,
{
    video: Arc<V>,
    camera: CameraManager<D>,
    options: ScannerOptions,
    on_decode: DecodeCallback,
    on_decode_error: Option<DecodeErrorCallback>,
    scan_region: ScanRegionFn,
    engine: Option<Box<dyn DecodeEngine + Send>>,
    worker: Option<DecodeWorker>,
    dispatch: Option<JoinHandle<()>>,
    extractor: Option<FrameExtractor<V>>,
    overlay: SharedOverlay,
    state: ScannerState,
}

impl<D, V> Scanner<D, V>
where
    D: MediaDevices,
    V: VideoElement<Stream = D::Stream>,
{
    pub fn new<E>(
        devices: D,
        video: Arc<V>,
        engine: E,
        on_decode: impl Fn(ScanResult) + Send + Sync + 'static,
        mut options: ScannerOptions,
    ) -> Self
    where
        E: DecodeEngine + Send + 'static,
    {
        let config = CameraConfig::default()
            .with_preferred_camera(options.preferred_camera().clone())
            .with_resolution(options.camera_resolution());
        let camera = match options.take_device_cache() {
            Some(cache) => CameraManager::with_cache(devices, config, cache),
            None => CameraManager::new(devices, config),
        };
        let scan_region = options.scan_region_fn().unwrap_or_else(default_scan_region_fn);

        Self {
            video,
            camera,
            on_decode: Arc::new(on_decode),
            on_decode_error: options.on_decode_error(),
            scan_region,
            options,
            engine: Some(Box::new(engine)),
            worker: None,
            dispatch: None,
            extractor: None,
            overlay: Arc::new(Mutex::new(None)),
            state: ScannerState::Idle,
        }
    }

    /// Start the camera and begin scanning. Resolves once the camera plays.
    pub async fn start(&mut self) -> Result<(), ScannerError> {
        match self.state {
            ScannerState::Destroyed => return Err(ScannerError::Destroyed),
            ScannerState::Active => return Ok(()),
            ScannerState::Idle | ScannerState::Paused => {}
        }

        let t0 = Instant::now();
        self.setup_overlay();

        self.camera.start(&*self.video).await?;
        log::debug!("scanner start: camera ready {}ms", t0.elapsed().as_millis());

        if let Some(overlay) = lock(&self.overlay).as_mut() {
            let (region, _) = current_region(&*self.video, &self.scan_region);
            overlay.update_scan_region(region);
        }

        if self.extractor.is_none() {
            let config = ExtractorConfig::default()
                .with_max_scans_per_second(self.options.max_scans_per_second())
                .with_display_refresh(self.options.display_refresh());
            self.extractor = Some(FrameExtractor::new(
                self.video.clone(),
                config,
                self.scan_region.clone(),
            ));
        }
        if self.worker.is_none() {
            let tw = Instant::now();
            self.spawn_worker();
            log::debug!("scanner start: worker created {}ms", tw.elapsed().as_millis());
        }

        self.start_sampling();
        self.state = ScannerState::Active;
        log::debug!("scanner start: total {}ms", t0.elapsed().as_millis());
        Ok(())
    }

    /// Stop scanning and release the camera. The worker and frame extractor
    /// are kept for the next `start`.
    pub fn stop(&mut self) {
        if self.state == ScannerState::Destroyed {
            return;
        }
        if let Some(extractor) = self.extractor.as_mut() {
            extractor.stop();
        }
        self.camera.stop();
        self.video.attach(None);
        self.state = ScannerState::Idle;
    }

    /// Stop everything and free the worker, extractor and overlay. The
    /// scanner cannot be started again.
    pub fn destroy(&mut self) {
        if self.state == ScannerState::Destroyed {
            return;
        }
        self.stop();
        if let Some(mut extractor) = self.extractor.take() {
            extractor.destroy();
        }
        if let Some(mut overlay) = lock(&self.overlay).take() {
            overlay.destroy();
        }
        if let Some(dispatch) = self.dispatch.take() {
            dispatch.abort();
        }
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
        }
        self.engine = None;
        self.state = ScannerState::Destroyed;
    }

    /// Halt sampling, optionally releasing the camera too. Returns `false`
    /// when the scanner was not started.
    pub fn pause(&mut self, stop_stream_immediately: bool) -> bool {
        if !matches!(self.state, ScannerState::Active | ScannerState::Paused) {
            return false;
        }
        if let Some(extractor) = self.extractor.as_mut() {
            extractor.stop();
        }
        if stop_stream_immediately {
            self.camera.stop();
            self.video.attach(None);
        }
        self.state = ScannerState::Paused;
        true
    }

    /// Switch to another camera by facing mode or device id.
    ///
    /// Sampling is stopped for the duration of the switch and resumed only
    /// once the new camera plays.
    pub async fn set_camera(&mut self, selector: impl Into<CameraSelector>) -> Result<(), ScannerError> {
        if self.state == ScannerState::Destroyed {
            return Err(ScannerError::Destroyed);
        }
        let was_active = self.state == ScannerState::Active;
        if was_active {
            if let Some(extractor) = self.extractor.as_mut() {
                extractor.stop();
            }
        }

        if let Err(e) = self.camera.set_camera(selector, &*self.video).await {
            if was_active {
                self.state = ScannerState::Idle;
            }
            return Err(e.into());
        }

        if was_active {
            self.start_sampling();
        }
        Ok(())
    }

    pub fn has_flash(&self) -> bool {
        self.camera.has_flash()
    }

    pub fn is_flash_on(&self) -> bool {
        self.camera.is_flash_on()
    }

    pub async fn toggle_flash(&self) -> Result<bool, ScannerError> {
        Ok(self.camera.toggle_flash().await?)
    }

    pub async fn turn_flash_on(&self) -> Result<bool, ScannerError> {
        Ok(self.camera.turn_flash_on().await?)
    }

    pub async fn turn_flash_off(&self) -> Result<bool, ScannerError> {
        Ok(self.camera.turn_flash_off().await?)
    }

    /// Choose whether inverted (light on dark) codes are searched for.
    /// Does nothing before the first `start`.
    pub fn set_inversion_mode(&self, mode: InversionMode) {
        let Some(worker) = &self.worker else {
            return;
        };
        let patch = DecoderOptionsPatch::new().with_try_invert(mode.try_invert());
        if let Err(e) = worker.configure(patch) {
            log::error!("failed to reconfigure decode worker: {}", e);
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ScannerState::Active
    }

    pub fn is_paused(&self) -> bool {
        self.state == ScannerState::Paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == ScannerState::Destroyed
    }

    pub fn video(&self) -> &Arc<V> {
        &self.video
    }

    pub fn camera(&self) -> &CameraManager<D> {
        &self.camera
    }

    /// The scan region for the current video dimensions.
    pub fn scan_region(&self) -> Region {
        current_region(&*self.video, &self.scan_region).0
    }

    fn setup_overlay(&mut self) {
        if lock(&self.overlay).is_some() {
            return;
        }
        let config = OverlayConfig {
            highlight_scan_region: self.options.highlight_scan_region(),
            highlight_code_outline: self.options.highlight_code_outline(),
        };
        let Some(surface) = self.options.take_overlay() else {
            if !config.is_custom() {
                log::debug!("highlighting requested without an overlay surface");
            }
            return;
        };

        let mut overlay = ScanOverlay::new(surface, config);
        match overlay.setup() {
            Ok(()) => *lock(&self.overlay) = Some(overlay),
            Err(e) => log::warn!("overlay setup failed, continuing without it: {}", e),
        }
    }

    fn spawn_worker(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        let mut worker = DecodeWorker::spawn(engine, DecoderOptions::default());
        if let Some(patch) = self.options.decoder_options() {
            if let Err(e) = worker.configure(patch.clone()) {
                log::error!("failed to configure decode worker: {}", e);
            }
        }

        if let (Some(responses), Some(extractor)) = (worker.take_responses(), &self.extractor) {
            let dispatch = Dispatch {
                idle: extractor.idle_handle(),
                on_decode: self.on_decode.clone(),
                on_decode_error: self.on_decode_error.clone(),
                overlay: self.overlay.clone(),
                video: self.video.clone(),
                scan_region: self.scan_region.clone(),
            };
            self.dispatch = Some(tokio::spawn(dispatch.run(responses)));
        }
        self.worker = Some(worker);
    }

    fn start_sampling(&mut self) {
        let handle = self.worker.as_ref().and_then(|w| w.handle());
        let (Some(extractor), Some(handle)) = (self.extractor.as_mut(), handle) else {
            return;
        };
        let idle = extractor.idle_handle();
        extractor.start(Box::new(move |sample| {
            debug_assert!(idle.is_busy(), "frame handed out while the worker is idle");
            if let Err(e) = handle.decode(sample) {
                log::error!("failed to post frame to decode worker: {}", e);
                idle.mark_idle();
            }
        }));
    }
}

impl<D, V> Drop for Scanner<D, V>
where
    D: MediaDevices,
    V: VideoElement<Stream = D::Stream>,
{
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Routes worker responses to the caller's callbacks and the overlay.
struct Dispatch<V: VideoElement> {
    idle: crate::WorkerIdleHandle,
    on_decode: DecodeCallback,
    on_decode_error: Option<DecodeErrorCallback>,
    overlay: SharedOverlay,
    video: Arc<V>,
    scan_region: ScanRegionFn,
}

impl<V: VideoElement> Dispatch<V> {
    async fn run(self, mut responses: mpsc::UnboundedReceiver<WorkerResponse>) {
        while let Some(response) = responses.recv().await {
            self.handle(response);
        }
        log::error!("decode worker channel closed");
        self.idle.mark_idle();
    }

    fn handle(&self, response: WorkerResponse) {
        // Ready arrives on the worker's own schedule, possibly while a frame
        // is in flight, so only frame responses release the busy flag.
        match response {
            WorkerResponse::Ready => log::debug!("decode worker ready"),
            WorkerResponse::Error(msg) => {
                self.idle.mark_idle();
                self.report(DecodeFailure::Engine(msg));
            }
            WorkerResponse::Result(results) => {
                self.idle.mark_idle();
                self.deliver(results);
            }
        }
    }

    fn deliver(&self, results: Vec<ScanResult>) {
        match results.into_iter().next() {
            Some(result) => {
                let corners = result.corner_points;
                (self.on_decode)(result);
                if let Some(overlay) = lock(&self.overlay).as_mut() {
                    let (region, dims) = current_region(&*self.video, &self.scan_region);
                    overlay.update_scan_region(region);
                    overlay.update_code_outline(Some(&corners), region, &dims);
                }
            }
            None => {
                self.report(DecodeFailure::NoCodeFound);
                if let Some(overlay) = lock(&self.overlay).as_mut() {
                    overlay.update_code_outline(None, Region::default(), &VideoDimensions::default());
                }
            }
        }
    }

    fn report(&self, failure: DecodeFailure) {
        if let Some(on_error) = &self.on_decode_error {
            on_error(failure);
        }
    }
}
