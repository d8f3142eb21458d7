use crate::Region;

/// An RGBA pixel buffer, 4 bytes per pixel, rows top to bottom.
///
/// A sample is handed to the decoder by value. Once it has been moved into a
/// decode request the producer has no way to touch it again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameSample {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameSample {
    pub const CHANNELS: usize = 4;

    /// A transparent black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    /// Wrap existing RGBA bytes. Returns `None` if the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != Self::byte_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * Self::CHANNELS
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Resize in place, reusing the allocation. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(Self::byte_len(width, height), 0);
    }

    /// RGBA value at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Copy `region` of `self` into `dst`, resizing `dst` to the region.
    ///
    /// Parts of the region that fall outside this buffer stay transparent
    /// black, the way a canvas treats out-of-bounds source pixels.
    pub fn crop_into(&self, region: Region, dst: &mut FrameSample) {
        dst.resize(region.width, region.height);
        let src_right = self.width.min(region.x.saturating_add(region.width));
        let src_bottom = self.height.min(region.y.saturating_add(region.height));
        if region.x >= src_right || region.y >= src_bottom {
            return;
        }
        let row_bytes = (src_right - region.x) as usize * Self::CHANNELS;
        for sy in region.y..src_bottom {
            let src_start = (sy as usize * self.width as usize + region.x as usize) * Self::CHANNELS;
            let dst_start = ((sy - region.y) as usize * region.width as usize) * Self::CHANNELS;
            dst.data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&self.data[src_start..src_start + row_bytes]);
        }
    }
}
