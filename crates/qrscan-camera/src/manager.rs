use crate::{
    ActiveStream, CameraConfig, CameraError, CameraSelector, DeviceConstraint, DeviceIdCache,
    DeviceInfo, DeviceKind, FacingMode, FileDeviceIdCache, MediaConstraints, MediaDevices,
    MediaError, MediaErrorKind, MediaStream, MediaTrack, Resolution, VideoConstraints,
    VideoElement, slot::dispose,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// A camera as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub id: String,
    pub label: String,
}

/// Verdict on one candidate camera during the autofocus upgrade.
enum Candidate {
    Accept,
    Reject(&'static str),
}

/// Owns the camera stream of one scanner.
///
/// At most one stream is live at a time. Every stream opened while probing
/// for a better camera is either installed as the active stream or disposed
/// before the next one is opened.
pub struct CameraManager<D: MediaDevices> {
    devices: D,
    selector: CameraSelector,
    resolution: Resolution,
    cache: Arc<dyn DeviceIdCache>,
    active: ActiveStream<D::Stream>,
}

impl<D: MediaDevices> CameraManager<D> {
    /// Create a manager that remembers good devices in the default on-disk cache.
    pub fn new(devices: D, config: CameraConfig) -> Self {
        Self::with_cache(devices, config, Arc::new(FileDeviceIdCache::default_location()))
    }

    pub fn with_cache(devices: D, config: CameraConfig, cache: Arc<dyn DeviceIdCache>) -> Self {
        Self {
            devices,
            selector: config.preferred_camera().clone(),
            resolution: config.resolution(),
            cache,
            active: ActiveStream::new(),
        }
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn selector(&self) -> &CameraSelector {
        &self.selector
    }

    pub fn stream(&self) -> Option<&D::Stream> {
        self.active.get()
    }

    pub fn is_started(&self) -> bool {
        self.active.is_some()
    }

    /// Acquire a camera and show it in `video`.
    ///
    /// Does nothing if a stream is already held.
    pub async fn start<V>(&mut self, video: &V) -> Result<(), CameraError>
    where
        V: VideoElement<Stream = D::Stream>,
    {
        if self.active.is_some() {
            return Ok(());
        }

        let t0 = Instant::now();
        let stream = self.acquire_stream().await?;
        self.active.replace(stream);
        let t1 = Instant::now();
        log::debug!("acquire_stream: {}ms", (t1 - t0).as_millis());

        // Swap cameras before anything is shown so the user never sees the
        // rejected one.
        self.ensure_best_camera().await?;
        let t2 = Instant::now();
        log::debug!("ensure_best_camera: {}ms", (t2 - t1).as_millis());

        let Some(stream) = self.active.get() else {
            return Err(CameraError::Acquisition(MediaError::new(
                MediaErrorKind::Abort,
                "camera stream lost",
            )));
        };
        video.attach(Some(stream));
        if let Err(e) = video.play().await {
            video.attach(None);
            self.active.release();
            return Err(CameraError::Playback(e));
        }
        let t3 = Instant::now();
        log::debug!("video.play: {}ms", (t3 - t2).as_millis());
        log::debug!("camera start total: {}ms", (t3 - t0).as_millis());

        if let Some(mode) = self.selector.facing_mode() {
            if let Some(device_id) = self.current_device_id() {
                self.cache.store(mode, &device_id);
            }
        }

        Ok(())
    }

    /// Stop every track of the active stream. Safe when already stopped.
    pub fn stop(&mut self) {
        if self.active.release() {
            log::debug!("camera stopped");
        }
    }

    /// Switch to another camera: stop, then start with the new selector.
    pub async fn set_camera<V>(
        &mut self,
        selector: impl Into<CameraSelector>,
        video: &V,
    ) -> Result<(), CameraError>
    where
        V: VideoElement<Stream = D::Stream>,
    {
        self.stop();
        self.selector = selector.into();
        self.start(video).await
    }

    pub fn has_flash(&self) -> bool {
        self.active
            .video_track()
            .is_some_and(|track| track.capabilities().torch == Some(true))
    }

    pub fn is_flash_on(&self) -> bool {
        self.active
            .video_track()
            .is_some_and(|track| track.settings().torch == Some(true))
    }

    /// Flip the torch. Returns `Ok(false)` when there is no active track.
    pub async fn toggle_flash(&self) -> Result<bool, CameraError> {
        let on = !self.is_flash_on();
        self.set_torch(on).await
    }

    pub async fn turn_flash_on(&self) -> Result<bool, CameraError> {
        self.set_torch(true).await
    }

    pub async fn turn_flash_off(&self) -> Result<bool, CameraError> {
        self.set_torch(false).await
    }

    async fn set_torch(&self, on: bool) -> Result<bool, CameraError> {
        let Some(track) = self.active.video_track() else {
            return Ok(false);
        };
        track.apply_torch(on).await.map_err(|e| {
            log::debug!("torch constraint rejected: {}", e);
            CameraError::FlashUnsupported
        })?;
        Ok(true)
    }

    /// True iff at least one video input is enumerated. Enumeration errors
    /// count as "no camera".
    pub async fn has_camera(devices: &D) -> bool {
        match devices.enumerate_devices().await {
            Ok(list) => list.iter().any(|d| d.kind == DeviceKind::VideoInput),
            Err(e) => {
                log::debug!("enumerate_devices failed: {}", e);
                false
            }
        }
    }

    /// List video inputs.
    ///
    /// With `request_labels`, a throwaway stream is opened and closed first so
    /// the platform asks for permission and reveals device labels. Failure of
    /// that step only means the labels stay blank.
    pub async fn list_cameras(
        devices: &D,
        request_labels: bool,
    ) -> Result<Vec<CameraInfo>, CameraError> {
        if request_labels {
            match devices.get_user_media(&MediaConstraints::any_video()).await {
                Ok(stream) => dispose(stream),
                Err(e) => log::debug!("label permission request failed: {}", e),
            }
        }

        let list = devices
            .enumerate_devices()
            .await
            .map_err(CameraError::Enumeration)?;
        Ok(list
            .into_iter()
            .filter(|d| d.kind == DeviceKind::VideoInput)
            .map(|d| {
                let label = if d.label.is_empty() {
                    let short: String = d.device_id.chars().take(8).collect();
                    format!("Camera {short}")
                } else {
                    d.label
                };
                CameraInfo {
                    id: d.device_id,
                    label,
                }
            })
            .collect())
    }

    fn current_device_id(&self) -> Option<String> {
        self.active
            .video_track()
            .and_then(|track| track.settings().device_id)
    }

    fn resolution_constraints(&self, video: &mut VideoConstraints) {
        video.width = Some(self.resolution.width_or_default());
        video.height = Some(self.resolution.height_or_default());
    }

    fn build_constraints(&self, include_resolution: bool) -> MediaConstraints {
        let mut video = VideoConstraints {
            device: Some(match &self.selector {
                CameraSelector::Facing(mode) => DeviceConstraint::FacingMode(*mode),
                CameraSelector::Device(id) => DeviceConstraint::DeviceId(id.clone()),
            }),
            ..Default::default()
        };
        if include_resolution {
            self.resolution_constraints(&mut video);
        }
        MediaConstraints { video }
    }

    fn exact_device_constraints(&self, device_id: Option<&str>) -> MediaConstraints {
        let mut video = VideoConstraints {
            device: device_id.map(|id| DeviceConstraint::DeviceId(id.to_string())),
            ..Default::default()
        };
        self.resolution_constraints(&mut video);
        MediaConstraints { video }
    }

    /// Walk the constraint ladder from most to least specific.
    async fn acquire_stream(&self) -> Result<D::Stream, CameraError> {
        let mut attempts: Vec<(&'static str, MediaConstraints)> = Vec::with_capacity(4);

        if let Some(mode) = self.selector.facing_mode() {
            if let Some(cached_id) = self.cache.load(mode) {
                attempts.push(("cached device id", self.exact_device_constraints(Some(&cached_id))));
            }
        }
        attempts.push(("full constraints", self.build_constraints(true)));
        attempts.push(("no resolution", self.build_constraints(false)));
        attempts.push(("bare minimum", MediaConstraints::any_video()));

        let mut last_error = None;
        for (label, constraints) in &attempts {
            let t = Instant::now();
            match self.devices.get_user_media(constraints).await {
                Ok(stream) => {
                    log::debug!("get_user_media({}): {}ms ok", label, t.elapsed().as_millis());
                    return Ok(stream);
                }
                Err(e) => {
                    log::debug!(
                        "get_user_media({}): {}ms failed: {}",
                        label,
                        t.elapsed().as_millis(),
                        e
                    );
                    let err = CameraError::from_acquisition(e);
                    if !err.is_transient() {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CameraError::Acquisition(MediaError::new(
                MediaErrorKind::Other,
                "no constraints attempted",
            ))
        }))
    }

    /// Replace the active stream with one that has continuous autofocus, if
    /// the current camera explicitly lacks it.
    ///
    /// Only runs for a symbolic facing mode. Candidates are tried in
    /// enumeration order and the first match wins.
    async fn ensure_best_camera(&mut self) -> Result<(), CameraError> {
        let Some(mode) = self.selector.facing_mode() else {
            log::debug!("ensure_best_camera: skipped (specific device id)");
            return Ok(());
        };

        let Some(track) = self.active.video_track() else {
            return Ok(());
        };
        let capabilities = track.capabilities();
        match &capabilities.focus_mode {
            // Not reported at all, or already autofocusing.
            None => {
                log::debug!("ensure_best_camera: skipped (focus mode not reported)");
                return Ok(());
            }
            Some(modes) if capabilities.has_continuous_focus() => {
                log::debug!("ensure_best_camera: skipped (focus modes {:?})", modes);
                return Ok(());
            }
            Some(modes) => {
                log::debug!("ensure_best_camera: camera lacks autofocus (focus modes {:?})", modes);
            }
        }
        let current_id = track.settings().device_id;

        // Enumerate while the stream is live so device ids are populated.
        let devices = match self.devices.enumerate_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                log::debug!("ensure_best_camera: enumerate_devices failed: {}", e);
                return Ok(());
            }
        };
        let candidates: Vec<DeviceInfo> = devices
            .into_iter()
            .filter(|d| {
                d.kind == DeviceKind::VideoInput && Some(&d.device_id) != current_id.as_ref()
            })
            .collect();
        log::debug!("ensure_best_camera: testing {} candidate camera(s)", candidates.len());
        if candidates.is_empty() {
            return Ok(());
        }

        // Many devices only allow one open camera at a time.
        self.active.release();

        for candidate in &candidates {
            let name = if candidate.label.is_empty() {
                candidate.device_id.chars().take(8).collect()
            } else {
                candidate.label.clone()
            };
            let t = Instant::now();
            let constraints = self.exact_device_constraints(Some(&candidate.device_id));
            let stream = match self.devices.get_user_media(&constraints).await {
                Ok(stream) => stream,
                Err(e) => {
                    log::debug!(
                        "ensure_best_camera: candidate {}: get_user_media failed after {}ms: {}",
                        name,
                        t.elapsed().as_millis(),
                        e
                    );
                    continue;
                }
            };

            match judge(&stream, mode) {
                Candidate::Accept => {
                    log::debug!("ensure_best_camera: switched to {}", name);
                    self.active.replace(stream);
                    return Ok(());
                }
                Candidate::Reject(reason) => {
                    log::debug!("ensure_best_camera: candidate {} rejected: {}", name, reason);
                    dispose(stream);
                }
            }
        }

        // No better camera; go back to the original one.
        let reopen = self.exact_device_constraints(current_id.as_deref());
        match self.devices.get_user_media(&reopen).await {
            Ok(stream) => self.active.replace(stream),
            Err(e) => {
                log::debug!("ensure_best_camera: reopening original failed: {}", e);
                let stream = self
                    .devices
                    .get_user_media(&self.build_constraints(true))
                    .await
                    .map_err(|e| {
                        log::warn!("could not recover camera after autofocus search: {}", e);
                        CameraError::Acquisition(e)
                    })?;
                self.active.replace(stream);
            }
        }
        Ok(())
    }
}

fn judge<S: MediaStream>(stream: &S, mode: FacingMode) -> Candidate {
    let Some(track) = stream.video_track() else {
        return Candidate::Reject("no video track");
    };
    if let Some(facing) = track.settings().facing_mode {
        if facing != mode {
            return Candidate::Reject("facing mode mismatch");
        }
    }
    if track.capabilities().has_continuous_focus() {
        Candidate::Accept
    } else {
        Candidate::Reject("no continuous autofocus")
    }
}
