use serde::{Deserialize, Serialize};

/// Symbologies an engine may be asked to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeFormat {
    QrCode,
    MicroQrCode,
    RmQrCode,
    Aztec,
    DataMatrix,
    Pdf417,
}

/// Engine settings used for every decode.
///
/// The format allow-list is always `[QrCode]` once options pass through
/// [`DecoderOptions::apply`] or [`DecoderOptions::pinned`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderOptions {
    pub formats: Vec<BarcodeFormat>,
    pub try_harder: bool,
    /// Also look for light-on-dark codes.
    pub try_invert: bool,
    pub try_rotate: bool,
    pub try_denoise: bool,
    /// Retry on a half-size copy of large frames.
    pub try_downscale: bool,
    /// 0 means unlimited.
    pub max_number_of_symbols: u32,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            formats: vec![BarcodeFormat::QrCode],
            try_harder: true,
            try_invert: true,
            try_rotate: true,
            try_denoise: false,
            try_downscale: true,
            max_number_of_symbols: 1,
        }
    }
}

impl DecoderOptions {
    /// Merge `patch` into these options and re-pin the format list.
    pub fn apply(&mut self, patch: &DecoderOptionsPatch) {
        if let Some(v) = patch.try_harder {
            self.try_harder = v;
        }
        if let Some(v) = patch.try_invert {
            self.try_invert = v;
        }
        if let Some(v) = patch.try_rotate {
            self.try_rotate = v;
        }
        if let Some(v) = patch.try_denoise {
            self.try_denoise = v;
        }
        if let Some(v) = patch.try_downscale {
            self.try_downscale = v;
        }
        if let Some(v) = patch.max_number_of_symbols {
            self.max_number_of_symbols = v;
        }
        self.pin_formats();
    }

    /// Defaults with `patch` applied.
    pub fn with_patch(patch: &DecoderOptionsPatch) -> Self {
        let mut options = Self::default();
        options.apply(patch);
        options
    }

    pub fn pinned(mut self) -> Self {
        self.pin_formats();
        self
    }

    fn pin_formats(&mut self) {
        self.formats = vec![BarcodeFormat::QrCode];
    }
}

/// A partial update of [`DecoderOptions`].
///
/// `formats` is accepted so callers can pass a full option set, but it is
/// ignored when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptionsPatch {
    pub formats: Option<Vec<BarcodeFormat>>,
    pub try_harder: Option<bool>,
    pub try_invert: Option<bool>,
    pub try_rotate: Option<bool>,
    pub try_denoise: Option<bool>,
    pub try_downscale: Option<bool>,
    pub max_number_of_symbols: Option<u32>,
}

impl DecoderOptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_try_harder(mut self, v: bool) -> Self {
        self.try_harder = Some(v);
        self
    }

    pub fn with_try_invert(mut self, v: bool) -> Self {
        self.try_invert = Some(v);
        self
    }

    pub fn with_try_rotate(mut self, v: bool) -> Self {
        self.try_rotate = Some(v);
        self
    }

    pub fn with_try_denoise(mut self, v: bool) -> Self {
        self.try_denoise = Some(v);
        self
    }

    pub fn with_try_downscale(mut self, v: bool) -> Self {
        self.try_downscale = Some(v);
        self
    }

    pub fn with_max_number_of_symbols(mut self, v: u32) -> Self {
        self.max_number_of_symbols = Some(v);
        self
    }

    pub fn with_formats(mut self, formats: Vec<BarcodeFormat>) -> Self {
        self.formats = Some(formats);
        self
    }

    /// Parse a JSON object such as `{"try_invert": false}`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
