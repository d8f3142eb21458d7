use crate::{BarcodeFormat, DecodeError, DecoderOptions};
use qrscan_base::{FrameSample, Point};
use serde::{Deserialize, Serialize};

/// Pixels handed to a [`DecodeEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    /// Raw RGBA pixels.
    Pixels(FrameSample),
    /// An encoded image file (PNG, JPEG, ...).
    Encoded(Vec<u8>),
}

/// Corners of a detected symbol as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl Position {
    /// Corners in clockwise order starting at the top left.
    pub fn clockwise(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// One detection. Invalid detections (located but not decodable) are still
/// reported by engines and filtered out by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedSymbol {
    pub text: String,
    pub is_valid: bool,
    pub format: BarcodeFormat,
    pub position: Position,
}

/// A decoded QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub data: String,
    /// Clockwise from top left, in the coordinates of the decoded image.
    pub corner_points: [Point; 4],
}

impl From<&DetectedSymbol> for ScanResult {
    fn from(symbol: &DetectedSymbol) -> Self {
        Self {
            data: symbol.text.clone(),
            corner_points: symbol.position.clockwise(),
        }
    }
}

/// Keep valid symbols only, in engine order.
pub fn valid_results(symbols: &[DetectedSymbol]) -> Vec<ScanResult> {
    symbols
        .iter()
        .filter(|s| s.is_valid)
        .map(ScanResult::from)
        .collect()
}

/// A barcode reader.
///
/// Engines are driven from a single thread and may keep state between calls.
pub trait DecodeEngine {
    fn read_barcodes(
        &mut self,
        input: ImageInput,
        options: &DecoderOptions,
    ) -> Result<Vec<DetectedSymbol>, DecodeError>;
}

impl<E: DecodeEngine + ?Sized> DecodeEngine for Box<E> {
    fn read_barcodes(
        &mut self,
        input: ImageInput,
        options: &DecoderOptions,
    ) -> Result<Vec<DetectedSymbol>, DecodeError> {
        (**self).read_barcodes(input, options)
    }
}
