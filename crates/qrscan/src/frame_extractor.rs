//! Samples frames from a video element at a bounded rate.
//!
//! A tokio task wakes on every display tick. At most one frame is in flight:
//! after a frame is handed out the extractor stays busy until the consumer
//! calls [`FrameExtractor::mark_worker_idle`] (or its [`WorkerIdleHandle`]).

use crate::ScanRegionFn;
use qrscan_base::FrameSample;
use qrscan_camera::VideoElement;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Called with each sampled frame.
pub type FrameCallback = Box<dyn FnMut(FrameSample) + Send>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    max_scans_per_second: f64,
    display_refresh: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_scans_per_second: 15.0,
            display_refresh: Duration::from_micros(16_667),
        }
    }
}

impl ExtractorConfig {
    pub fn with_max_scans_per_second(mut self, rate: f64) -> Self {
        self.max_scans_per_second = rate;
        self
    }

    /// Period of the display tick the loop runs on.
    pub fn with_display_refresh(mut self, period: Duration) -> Self {
        self.display_refresh = period;
        self
    }

    pub fn max_scans_per_second(&self) -> f64 {
        self.max_scans_per_second
    }

    pub fn display_refresh(&self) -> Duration {
        self.display_refresh
    }

    /// Minimum time between two sampled frames. A non-positive rate never
    /// samples.
    pub fn min_interval(&self) -> Duration {
        if self.max_scans_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / self.max_scans_per_second)
        } else {
            Duration::MAX
        }
    }
}

/// State shared between the extractor, its tick task and idle handles.
#[derive(Debug, Default)]
struct ExtractorShared {
    running: AtomicBool,
    worker_busy: AtomicBool,
    last_scan: Mutex<Option<Instant>>,
    surface: Mutex<FrameSample>,
}

/// Lets the consumer of sampled frames clear the busy flag.
#[derive(Debug, Clone)]
pub struct WorkerIdleHandle {
    shared: Arc<ExtractorShared>,
}

impl WorkerIdleHandle {
    pub fn mark_idle(&self) {
        self.shared.worker_busy.store(false, Ordering::SeqCst);
    }

    pub fn mark_busy(&self) {
        self.shared.worker_busy.store(true, Ordering::SeqCst);
    }

    pub fn is_busy(&self) -> bool {
        self.shared.worker_busy.load(Ordering::SeqCst)
    }
}

pub struct FrameExtractor<V: VideoElement> {
    video: Arc<V>,
    config: ExtractorConfig,
    scan_region: ScanRegionFn,
    shared: Arc<ExtractorShared>,
    task: Option<JoinHandle<()>>,
}

impl<V: VideoElement> FrameExtractor<V> {
    pub fn new(video: Arc<V>, config: ExtractorConfig, scan_region: ScanRegionFn) -> Self {
        Self {
            video,
            config,
            scan_region,
            shared: Arc::new(ExtractorShared::default()),
            task: None,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn is_worker_busy(&self) -> bool {
        self.shared.worker_busy.load(Ordering::SeqCst)
    }

    pub fn idle_handle(&self) -> WorkerIdleHandle {
        WorkerIdleHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn mark_worker_idle(&self) {
        self.shared.worker_busy.store(false, Ordering::SeqCst);
    }

    pub fn mark_worker_busy(&self) {
        self.shared.worker_busy.store(true, Ordering::SeqCst);
    }

    /// Start sampling. Does nothing if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, on_frame: FrameCallback) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let video = self.video.clone();
        let shared = self.shared.clone();
        let scan_region = self.scan_region.clone();
        let config = self.config;
        self.task = Some(tokio::spawn(async move {
            run(video, shared, scan_region, config, on_frame).await;
        }));
    }

    /// Stop sampling. The pending tick is cancelled before this returns and
    /// the busy flag is left as it is.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop and release the drawing surface.
    pub fn destroy(&mut self) {
        self.stop();
        *lock(&self.shared.surface) = FrameSample::default();
    }
}

impl<V: VideoElement> Drop for FrameExtractor<V> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

async fn run<V: VideoElement>(
    video: Arc<V>,
    shared: Arc<ExtractorShared>,
    scan_region: ScanRegionFn,
    config: ExtractorConfig,
    mut on_frame: FrameCallback,
) {
    let min_interval = config.min_interval();
    let mut ticks = time::interval(config.display_refresh);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = ticks.tick().await;
        if !shared.running.load(Ordering::SeqCst) {
            break;
        }
        if let Some(sample) = sample_frame(&*video, &shared, &scan_region, min_interval, now) {
            on_frame(sample);
        }
    }
}

/// One tick. Returns the frame to hand out, with the busy flag already set.
fn sample_frame<V: VideoElement>(
    video: &V,
    shared: &ExtractorShared,
    scan_region: &ScanRegionFn,
    min_interval: Duration,
    now: Instant,
) -> Option<FrameSample> {
    if shared.worker_busy.load(Ordering::SeqCst) {
        return None;
    }

    {
        let mut last_scan = lock(&shared.last_scan);
        if let Some(last) = *last_scan {
            if now.saturating_duration_since(last) < min_interval {
                return None;
            }
        }
        if !video.ready_state().has_current_data() {
            return None;
        }
        *last_scan = Some(now);
    }

    let dims = video.dimensions();
    let region = scan_region(&dims).resolve(dims.video_width, dims.video_height);
    if region.is_empty() {
        return None;
    }

    let sample = {
        let mut surface = lock(&shared.surface);
        surface.resize(region.width, region.height);
        video.draw_region(region, &mut surface);
        surface.clone()
    };

    shared.worker_busy.store(true, Ordering::SeqCst);
    Some(sample)
}
