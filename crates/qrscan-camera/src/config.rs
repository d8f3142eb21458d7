use crate::{CameraSelector, ConstraintValue};

/// Requested capture resolution. Unset axes fall back to the ideal default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub width: Option<ConstraintValue>,
    pub height: Option<ConstraintValue>,
}

impl Resolution {
    pub const DEFAULT_WIDTH: u32 = 1920;
    pub const DEFAULT_HEIGHT: u32 = 1080;

    pub fn ideal(width: u32, height: u32) -> Self {
        Self {
            width: Some(ConstraintValue::Ideal(width)),
            height: Some(ConstraintValue::Ideal(height)),
        }
    }

    pub fn width_or_default(&self) -> ConstraintValue {
        self.width
            .unwrap_or(ConstraintValue::Ideal(Self::DEFAULT_WIDTH))
    }

    pub fn height_or_default(&self) -> ConstraintValue {
        self.height
            .unwrap_or(ConstraintValue::Ideal(Self::DEFAULT_HEIGHT))
    }
}

/// Configuration for camera acquisition.
#[derive(Clone, Debug, Default)]
pub struct CameraConfig {
    preferred_camera: CameraSelector,
    resolution: Resolution,
}

impl CameraConfig {
    /// Set the preferred camera (facing mode or device id).
    pub fn with_preferred_camera(mut self, selector: impl Into<CameraSelector>) -> Self {
        self.preferred_camera = selector.into();
        self
    }

    /// Override the requested capture resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn preferred_camera(&self) -> &CameraSelector {
        &self.preferred_camera
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}
