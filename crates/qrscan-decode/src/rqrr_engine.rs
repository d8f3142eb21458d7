//! A [`DecodeEngine`] backed by the pure-Rust `rqrr` QR reader.
//!
//! `rqrr` always searches every orientation, so `try_rotate` and
//! `try_harder` have no further effect here. `try_invert`, `try_downscale`
//! and `try_denoise` add extra passes over the frame.

use crate::{BarcodeFormat, DecodeEngine, DecodeError, DecoderOptions, DetectedSymbol, ImageInput, Position};
use crates_image::imageops::{self, FilterType};
use crates_image::{GrayImage, Luma};
use qrscan_base::{FrameSample, Point};

/// Frames smaller than this on their short side are never downscaled.
const DOWNSCALE_MIN_DIMENSION: u32 = 512;
const DENOISE_SIGMA: f32 = 0.8;

#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrEngine;

impl RqrrEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DecodeEngine for RqrrEngine {
    fn read_barcodes(
        &mut self,
        input: ImageInput,
        options: &DecoderOptions,
    ) -> Result<Vec<DetectedSymbol>, DecodeError> {
        if !options.formats.contains(&BarcodeFormat::QrCode) {
            return Ok(Vec::new());
        }

        let mut luma = match input {
            ImageInput::Pixels(sample) => luma_from_rgba(&sample),
            ImageInput::Encoded(bytes) => crates_image::load_from_memory(&bytes)?.to_luma8(),
        };
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        if options.try_denoise {
            luma = imageops::blur(&luma, DENOISE_SIGMA);
        }

        let mut symbols = detect(&luma, 1.0);

        if !has_valid(&symbols) && options.try_invert {
            let mut inverted = luma.clone();
            imageops::invert(&mut inverted);
            symbols.extend(detect(&inverted, 1.0));
        }

        if !has_valid(&symbols)
            && options.try_downscale
            && width.min(height) >= DOWNSCALE_MIN_DIMENSION
        {
            let small = imageops::resize(&luma, width / 2, height / 2, FilterType::Triangle);
            symbols.extend(detect(&small, 2.0));
        }

        // Valid symbols first so a limit never hides a decoded code behind
        // an undecodable one.
        symbols.sort_by_key(|s| !s.is_valid);
        let limit = options.max_number_of_symbols as usize;
        if limit > 0 {
            symbols.truncate(limit);
        }
        Ok(symbols)
    }
}

fn has_valid(symbols: &[DetectedSymbol]) -> bool {
    symbols.iter().any(|s| s.is_valid)
}

/// BT.601 luma, alpha ignored.
fn luma_from_rgba(sample: &FrameSample) -> GrayImage {
    GrayImage::from_fn(sample.width(), sample.height(), |x, y| {
        let [r, g, b, _] = sample.pixel(x, y).unwrap_or([0, 0, 0, 255]);
        Luma([((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u8])
    })
}

/// Locate and decode every grid in `luma`. Corners are multiplied by `scale`
/// to map back to the original frame.
fn detect(luma: &GrayImage, scale: f32) -> Vec<DetectedSymbol> {
    let (width, height) = luma.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32)[0]
        });

    prepared
        .detect_grids()
        .into_iter()
        .map(|grid| {
            let corner = |i: usize| {
                Point::new(grid.bounds[i].x as f32 * scale, grid.bounds[i].y as f32 * scale)
            };
            let position = Position {
                top_left: corner(0),
                top_right: corner(1),
                bottom_right: corner(2),
                bottom_left: corner(3),
            };
            match grid.decode() {
                Ok((_meta, text)) => DetectedSymbol {
                    text,
                    is_valid: true,
                    format: BarcodeFormat::QrCode,
                    position,
                },
                Err(e) => {
                    log::debug!("QR grid located but not decoded: {:?}", e);
                    DetectedSymbol {
                        text: String::new(),
                        is_valid: false,
                        format: BarcodeFormat::QrCode,
                        position,
                    }
                }
            }
        })
        .collect()
}
