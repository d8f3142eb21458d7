#![allow(dead_code)]

use qrscan_base::Point;
use qrscan_decode::{
    BarcodeFormat, DecodeEngine, DecodeError, DecoderOptions, DetectedSymbol, ImageInput, Position,
};
use qrscan_decode::crates_image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

pub enum Outcome {
    Symbols(Vec<DetectedSymbol>),
    Fail(String),
    Panic(&'static str),
}

/// What the engine was called with.
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Pixels { width: u32, height: u32 },
    Encoded(Vec<u8>),
}

/// A scripted engine. With an empty script every call finds nothing.
#[derive(Clone, Default)]
pub struct StubEngine {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    calls: Arc<Mutex<Vec<(Seen, DecoderOptions)>>>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, outcome: Outcome) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<(Seen, DecoderOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DecodeEngine for StubEngine {
    fn read_barcodes(
        &mut self,
        input: ImageInput,
        options: &DecoderOptions,
    ) -> Result<Vec<DetectedSymbol>, DecodeError> {
        let seen = match input {
            ImageInput::Pixels(sample) => Seen::Pixels {
                width: sample.width(),
                height: sample.height(),
            },
            ImageInput::Encoded(bytes) => Seen::Encoded(bytes),
        };
        self.calls.lock().unwrap().push((seen, options.clone()));

        let outcome = self.script.lock().unwrap().pop_front();
        match outcome {
            None => Ok(Vec::new()),
            Some(Outcome::Symbols(symbols)) => Ok(symbols),
            Some(Outcome::Fail(msg)) => Err(DecodeError::Engine(msg)),
            Some(Outcome::Panic(msg)) => panic!("{}", msg),
        }
    }
}

/// A valid symbol with corners at (10,10)-(90,90).
pub fn symbol(text: &str) -> DetectedSymbol {
    DetectedSymbol {
        text: text.to_string(),
        is_valid: true,
        format: BarcodeFormat::QrCode,
        position: Position {
            top_left: Point::new(10.0, 10.0),
            top_right: Point::new(90.0, 10.0),
            bottom_left: Point::new(10.0, 90.0),
            bottom_right: Point::new(90.0, 90.0),
        },
    }
}

pub fn invalid_symbol() -> DetectedSymbol {
    DetectedSymbol {
        is_valid: false,
        text: String::new(),
        ..symbol("")
    }
}

pub fn clockwise() -> [Point; 4] {
    [
        Point::new(10.0, 10.0),
        Point::new(90.0, 10.0),
        Point::new(90.0, 90.0),
        Point::new(10.0, 90.0),
    ]
}

/// A rendered QR code for `text` with `module`-pixel modules and a four
/// module quiet zone, placed at (`left`, `top`) on a `width` x `height`
/// canvas. `inverted` draws light modules on a dark background.
pub struct QrFixture {
    pub image: GrayImage,
    /// Corners of the code area, clockwise from the top left.
    pub corners: [Point; 4],
}

pub fn qr_fixture(text: &str, module: u32, inverted: bool) -> QrFixture {
    let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
    let side = (code.width() as u32 + 8) * module;
    qr_fixture_on(text, module, inverted, side, side, 0, 0)
}

pub fn qr_fixture_on(
    text: &str,
    module: u32,
    inverted: bool,
    width: u32,
    height: u32,
    left: u32,
    top: u32,
) -> QrFixture {
    let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let (dark, light) = if inverted { (255, 0) } else { (0, 255) };
    let origin_x = left + 4 * module;
    let origin_y = top + 4 * module;

    let image = GrayImage::from_fn(width, height, |x, y| {
        let inside = x >= origin_x
            && y >= origin_y
            && x < origin_x + modules * module
            && y < origin_y + modules * module;
        if !inside {
            return Luma([light]);
        }
        let mx = (x - origin_x) / module;
        let my = (y - origin_y) / module;
        match colors[(my * modules + mx) as usize] {
            qrcode::Color::Dark => Luma([dark]),
            qrcode::Color::Light => Luma([light]),
        }
    });

    let (x0, y0) = (origin_x as f32, origin_y as f32);
    let end = (modules * module) as f32;
    QrFixture {
        image,
        corners: [
            Point::new(x0, y0),
            Point::new(x0 + end, y0),
            Point::new(x0 + end, y0 + end),
            Point::new(x0, y0 + end),
        ],
    }
}

impl QrFixture {
    pub fn png(&self) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(self.image.clone())
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }
}

/// Corners match within `tolerance` pixels, in order.
pub fn assert_corners_near(actual: &[Point; 4], expected: &[Point; 4], tolerance: f32) {
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a.x - e.x).abs() <= tolerance && (a.y - e.y).abs() <= tolerance,
            "corner {i}: got {a:?}, expected {e:?}"
        );
    }
}
