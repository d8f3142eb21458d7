//! One-shot decoding of still images.

use crate::{DecodeEngine, DecodeError, DecoderOptions, DecoderOptionsPatch, ImageInput, ScanImageError, ScanResult, valid_results};
use crates_image::DynamicImage;
use qrscan_base::{FrameSample, ScanRegion};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a still image comes from.
#[derive(Debug, Clone)]
pub enum ScanImageSource {
    /// Already-decoded image. Cropped to the scan region, if one is given.
    Image(DynamicImage),
    /// Raw RGBA pixels, passed to the engine as-is.
    Pixels(FrameSample),
    /// An encoded image file in memory.
    Bytes(Vec<u8>),
    File(PathBuf),
    /// `file://`, `http://` or `https://` URL.
    Url(String),
}

impl From<DynamicImage> for ScanImageSource {
    fn from(image: DynamicImage) -> Self {
        ScanImageSource::Image(image)
    }
}

impl From<FrameSample> for ScanImageSource {
    fn from(sample: FrameSample) -> Self {
        ScanImageSource::Pixels(sample)
    }
}

impl From<Vec<u8>> for ScanImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ScanImageSource::Bytes(bytes)
    }
}

impl From<PathBuf> for ScanImageSource {
    fn from(path: PathBuf) -> Self {
        ScanImageSource::File(path)
    }
}

impl From<&Path> for ScanImageSource {
    fn from(path: &Path) -> Self {
        ScanImageSource::File(path.to_path_buf())
    }
}

/// Options for [`scan_image`].
#[derive(Debug, Clone)]
pub struct ScanImageOptions {
    scan_region: Option<ScanRegion>,
    decoder_options: DecoderOptionsPatch,
    fetch_timeout: Duration,
}

impl Default for ScanImageOptions {
    fn default() -> Self {
        Self {
            scan_region: None,
            decoder_options: DecoderOptionsPatch::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ScanImageOptions {
    /// Only decode this part of the image. Missing extents cover the rest of
    /// the image past the offset. Raw [`ScanImageSource::Pixels`] are never
    /// cropped.
    pub fn with_scan_region(mut self, region: ScanRegion) -> Self {
        self.scan_region = Some(region);
        self
    }

    pub fn with_decoder_options(mut self, patch: DecoderOptionsPatch) -> Self {
        self.decoder_options = patch;
        self
    }

    /// Total time allowed for fetching an `http(s)://` source.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn scan_region(&self) -> Option<ScanRegion> {
        self.scan_region
    }

    pub fn decoder_options(&self) -> &DecoderOptionsPatch {
        &self.decoder_options
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}

/// Decode the first valid QR code in a still image.
///
/// Options start from the defaults with the caller's patch applied and
/// formats pinned to QR. Encoded sources are handed to the engine as-is
/// unless a scan region is set, in which case they are decoded and cropped
/// first.
///
/// The engine runs synchronously on the calling task and blocks its thread
/// for the whole decode. Large images are better scanned from
/// `tokio::task::spawn_blocking` or a dedicated thread.
pub async fn scan_image<E: DecodeEngine + ?Sized>(
    engine: &mut E,
    source: impl Into<ScanImageSource>,
    options: &ScanImageOptions,
) -> Result<ScanResult, ScanImageError> {
    let decoder_options = DecoderOptions::with_patch(&options.decoder_options);

    let input = match source.into() {
        ScanImageSource::Image(image) => ImageInput::Pixels(crop_image(&image, options.scan_region)?),
        ScanImageSource::Pixels(sample) => ImageInput::Pixels(sample),
        ScanImageSource::Bytes(bytes) => encoded_input(bytes, options.scan_region)?,
        ScanImageSource::File(path) => encoded_input(tokio::fs::read(&path).await?, options.scan_region)?,
        ScanImageSource::Url(url) => encoded_input(fetch(&url, options.fetch_timeout).await?, options.scan_region)?,
    };

    let symbols = engine.read_barcodes(input, &decoder_options)?;
    valid_results(&symbols)
        .into_iter()
        .next()
        .ok_or(ScanImageError::NoCodeFound)
}

fn encoded_input(bytes: Vec<u8>, region: Option<ScanRegion>) -> Result<ImageInput, DecodeError> {
    match region {
        None => Ok(ImageInput::Encoded(bytes)),
        Some(_) => {
            let image = crates_image::load_from_memory(&bytes)?;
            Ok(ImageInput::Pixels(crop_image(&image, region)?))
        }
    }
}

fn crop_image(image: &DynamicImage, region: Option<ScanRegion>) -> Result<FrameSample, DecodeError> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let full = FrameSample::from_rgba(width, height, rgba.into_raw()).ok_or(
        DecodeError::InvalidPixels {
            width,
            height,
            len: 0,
        },
    )?;
    match region {
        None => Ok(full),
        Some(region) => {
            let mut cropped = FrameSample::default();
            full.crop_into(region.resolve_within(width, height), &mut cropped);
            Ok(cropped)
        }
    }
}

async fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>, ScanImageError> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(tokio::fs::read(path).await?);
    }

    let parsed = reqwest::Url::parse(url).map_err(|_| ScanImageError::UnsupportedUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScanImageError::UnsupportedUrl(url.to_string()));
    }

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(parsed).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    log::debug!("fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}
