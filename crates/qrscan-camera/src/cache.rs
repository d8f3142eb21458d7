//! Last-known-good device id per facing mode.
//!
//! The cache is a hint that lets the camera manager skip the autofocus search
//! on later starts. Every failure is logged and swallowed.

use crate::FacingMode;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const KEY_PREFIX: &str = "qrscan:camera:";

fn key(mode: FacingMode) -> String {
    format!("{KEY_PREFIX}{mode}")
}

pub trait DeviceIdCache: Send + Sync {
    fn load(&self, mode: FacingMode) -> Option<String>;

    fn store(&self, mode: FacingMode, device_id: &str);
}

/// Persists the cache as a JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileDeviceIdCache {
    path: PathBuf,
}

impl FileDeviceIdCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CACHE_HOME/qrscan/cameras.json`, then `$HOME/.cache/...`, then
    /// the system temp directory.
    pub fn default_location() -> Self {
        let base = std::env::var_os("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
            .unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("qrscan").join("cameras.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Option<HashMap<String, String>> {
        let text = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&text) {
            Ok(map) => Some(map),
            Err(e) => {
                log::debug!("ignoring unreadable camera cache {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(map).map_err(std::io::Error::other)?;
        fs::write(&self.path, text)
    }
}

impl DeviceIdCache for FileDeviceIdCache {
    fn load(&self, mode: FacingMode) -> Option<String> {
        self.read_map()?.remove(&key(mode))
    }

    fn store(&self, mode: FacingMode, device_id: &str) {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key(mode), device_id.to_string());
        if let Err(e) = self.write_map(&map) {
            log::debug!("failed to write camera cache {:?}: {}", self.path, e);
        }
    }
}

/// Process-local cache, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryDeviceIdCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDeviceIdCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceIdCache for MemoryDeviceIdCache {
    fn load(&self, mode: FacingMode) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&key(mode)).cloned()
    }

    fn store(&self, mode: FacingMode, device_id: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key(mode), device_id.to_string());
    }
}

/// Never remembers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDeviceIdCache;

impl DeviceIdCache for NoDeviceIdCache {
    fn load(&self, _mode: FacingMode) -> Option<String> {
        None
    }

    fn store(&self, _mode: FacingMode, _device_id: &str) {}
}
