//! Visual feedback on top of the video: a scan-region marker and an outline
//! around the last decoded code.
//!
//! Drawing is delegated to an [`OverlaySurface`]; this module only decides
//! what to draw and maps corner points from video pixels into the element's
//! coordinate space.

use qrscan_base::{Point, Region, VideoDimensions};
use std::fmt;

/// How the video content is fitted into its element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectFit {
    /// Stretched to the element box.
    #[default]
    Fill,
    /// Scaled to fit inside the box, letterboxed.
    Contain,
    /// Scaled to cover the box, cropped.
    Cover,
}

/// Where the video content is actually drawn inside its element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedRect {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rendered rectangle of a `video_width` x `video_height` stream inside an
/// element of `element_width` x `element_height`.
pub fn rendered_video_rect(
    element_width: f32,
    element_height: f32,
    video_width: u32,
    video_height: u32,
    fit: ObjectFit,
) -> RenderedRect {
    let vw = video_width.max(1) as f32;
    let vh = video_height.max(1) as f32;
    let scale = match fit {
        ObjectFit::Fill => {
            return RenderedRect {
                offset_x: 0.0,
                offset_y: 0.0,
                width: element_width,
                height: element_height,
            };
        }
        ObjectFit::Contain => (element_width / vw).min(element_height / vh),
        ObjectFit::Cover => (element_width / vw).max(element_height / vh),
    };
    let width = vw * scale;
    let height = vh * scale;
    RenderedRect {
        offset_x: (element_width - width) / 2.0,
        offset_y: (element_height - height) / 2.0,
        width,
        height,
    }
}

/// Map corner points relative to `region` into element coordinates.
pub fn map_corner_points(
    points: &[Point; 4],
    region: Region,
    video_width: u32,
    video_height: u32,
    rendered: RenderedRect,
) -> [Point; 4] {
    let scale_x = rendered.width / video_width.max(1) as f32;
    let scale_y = rendered.height / video_height.max(1) as f32;
    points.map(|p| {
        let p = p.offset(region.x, region.y);
        Point::new(
            p.x * scale_x + rendered.offset_x,
            p.y * scale_y + rendered.offset_y,
        )
    })
}

/// Side of the scan-region marker: two thirds of the smaller container
/// dimension, rounded.
pub fn region_marker_size(container_width: f32, container_height: f32) -> u32 {
    (container_width.min(container_height) * 2.0 / 3.0).round().max(0.0) as u32
}

/// What the overlay asks its surface to show.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// A centered square marker of the given side.
    RegionMarker { size: u32 },
    /// A caller-provided overlay stretched over the whole container.
    FullSize,
    /// A polygon through these points, or hidden.
    CodeOutline(Option<[Point; 4]>),
}

/// A drawing target laid over the video element.
pub trait OverlaySurface: Send {
    /// Size of the container the video sits in, or `None` when the video is
    /// not laid out in one.
    fn container_size(&self) -> Option<(f32, f32)>;

    /// Size of the video element box.
    fn element_size(&self) -> (f32, f32);

    fn object_fit(&self) -> ObjectFit {
        ObjectFit::Fill
    }

    fn draw(&mut self, shape: OverlayShape);

    /// Remove everything this overlay drew.
    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    /// The video element has no container to draw into.
    NoContainer,
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::NoContainer => write!(
                f,
                "video element must be laid out inside a container to show an overlay"
            ),
        }
    }
}

impl std::error::Error for OverlayError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayConfig {
    pub highlight_scan_region: bool,
    pub highlight_code_outline: bool,
}

impl OverlayConfig {
    /// No highlight requested: the surface is the caller's own overlay.
    pub fn is_custom(&self) -> bool {
        !self.highlight_scan_region && !self.highlight_code_outline
    }
}

pub struct ScanOverlay {
    surface: Box<dyn OverlaySurface>,
    config: OverlayConfig,
    marker: bool,
    outline: bool,
}

impl fmt::Debug for ScanOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanOverlay")
            .field("config", &self.config)
            .field("marker", &self.marker)
            .field("outline", &self.outline)
            .finish()
    }
}

impl ScanOverlay {
    pub fn new(surface: Box<dyn OverlaySurface>, config: OverlayConfig) -> Self {
        Self {
            surface,
            config,
            marker: false,
            outline: false,
        }
    }

    pub fn config(&self) -> OverlayConfig {
        self.config
    }

    /// Draw the initial shapes. Fails when there is no container.
    pub fn setup(&mut self) -> Result<(), OverlayError> {
        let (cw, ch) = self
            .surface
            .container_size()
            .ok_or(OverlayError::NoContainer)?;

        if self.config.is_custom() {
            self.surface.draw(OverlayShape::FullSize);
            return Ok(());
        }
        if self.config.highlight_scan_region {
            self.surface.draw(OverlayShape::RegionMarker {
                size: region_marker_size(cw, ch),
            });
            self.marker = true;
        }
        if self.config.highlight_code_outline {
            self.surface.draw(OverlayShape::CodeOutline(None));
            self.outline = true;
        }
        Ok(())
    }

    /// Re-size the region marker to the container.
    ///
    /// The marker tracks the container rather than the mapped region, so it
    /// stays inside the visible area when the video is cropped.
    pub fn update_scan_region(&mut self, _region: Region) {
        if !self.marker {
            return;
        }
        if let Some((cw, ch)) = self.surface.container_size() {
            self.surface.draw(OverlayShape::RegionMarker {
                size: region_marker_size(cw, ch),
            });
        }
    }

    /// Show the outline of a code found in `region`, or hide it.
    pub fn update_code_outline(
        &mut self,
        corner_points: Option<&[Point; 4]>,
        region: Region,
        dims: &VideoDimensions,
    ) {
        if !self.outline {
            return;
        }
        let Some(points) = corner_points else {
            self.surface.draw(OverlayShape::CodeOutline(None));
            return;
        };
        let (ew, eh) = self.surface.element_size();
        let rendered = rendered_video_rect(
            ew,
            eh,
            dims.video_width,
            dims.video_height,
            self.surface.object_fit(),
        );
        let mapped = map_corner_points(points, region, dims.video_width, dims.video_height, rendered);
        self.surface.draw(OverlayShape::CodeOutline(Some(mapped)));
    }

    pub fn destroy(&mut self) {
        if self.marker || self.outline {
            self.surface.clear();
        }
        self.marker = false;
        self.outline = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_is_element_box() {
        let rect = rendered_video_rect(400.0, 300.0, 1920, 1080, ObjectFit::Fill);
        assert_eq!(
            rect,
            RenderedRect {
                offset_x: 0.0,
                offset_y: 0.0,
                width: 400.0,
                height: 300.0
            }
        );
    }

    #[test]
    fn test_cover_crops_sides() {
        // 16:9 video in a square box: scaled to the box height.
        let rect = rendered_video_rect(360.0, 360.0, 1920, 1080, ObjectFit::Cover);
        assert!((rect.height - 360.0).abs() < 1e-3);
        assert!((rect.width - 640.0).abs() < 1e-3);
        assert!((rect.offset_x + 140.0).abs() < 1e-3);
        assert_eq!(rect.offset_y, 0.0);
    }

    #[test]
    fn test_contain_letterboxes() {
        let rect = rendered_video_rect(360.0, 360.0, 1920, 1080, ObjectFit::Contain);
        assert!((rect.width - 360.0).abs() < 1e-3);
        assert!((rect.height - 202.5).abs() < 1e-3);
        assert!((rect.offset_y - 78.75).abs() < 1e-3);
    }

    #[test]
    fn test_marker_size() {
        assert_eq!(region_marker_size(400.0, 300.0), 200);
        assert_eq!(region_marker_size(100.0, 100.0), 67);
    }
}
