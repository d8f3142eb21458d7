use serde::{Deserialize, Serialize};

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate by an integer pixel offset.
    pub fn offset(self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x + dx as f32,
            y: self.y + dy as f32,
        }
    }
}

/// A fully resolved rectangle in video-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// The sub-rectangle of a frame to analyze.
///
/// Every field is optional. Missing offsets default to 0 and missing extents
/// default to the full frame, see [`ScanRegion::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanRegion {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ScanRegion {
    /// The whole frame.
    pub fn full() -> Self {
        Self::default()
    }

    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Resolve against live video dimensions.
    ///
    /// Missing extents take the full video width/height regardless of the
    /// offset, matching how a frame is drawn from a video element.
    pub fn resolve(&self, frame_width: u32, frame_height: u32) -> Region {
        Region {
            x: self.x.unwrap_or(0),
            y: self.y.unwrap_or(0),
            width: self.width.unwrap_or(frame_width),
            height: self.height.unwrap_or(frame_height),
        }
    }

    /// Resolve against a still image.
    ///
    /// Missing extents take whatever remains of the image past the offset.
    pub fn resolve_within(&self, image_width: u32, image_height: u32) -> Region {
        let x = self.x.unwrap_or(0);
        let y = self.y.unwrap_or(0);
        Region {
            x,
            y,
            width: self.width.unwrap_or(image_width.saturating_sub(x)),
            height: self.height.unwrap_or(image_height.saturating_sub(y)),
        }
    }
}

impl From<Region> for ScanRegion {
    fn from(region: Region) -> Self {
        Self::new(region.x, region.y, region.width, region.height)
    }
}

/// Dimensions reported by a video element.
///
/// `video_width`/`video_height` are the live stream dimensions and stay 0
/// until stream metadata has loaded. `width`/`height` are the element's own
/// intrinsic size attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoDimensions {
    pub video_width: u32,
    pub video_height: u32,
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(video_width: u32, video_height: u32) -> Self {
        Self {
            video_width,
            video_height,
            width: 0,
            height: 0,
        }
    }

    pub fn with_element_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Live dimensions, falling back per axis to the element size while the
    /// stream has not reported any.
    pub fn effective(&self) -> (u32, u32) {
        let width = if self.video_width > 0 {
            self.video_width
        } else {
            self.width
        };
        let height = if self.video_height > 0 {
            self.video_height
        } else {
            self.height
        };
        (width, height)
    }
}
