use crate::{MediaError, MediaStream};
use qrscan_base::{FrameSample, Region, VideoDimensions};

/// How much media a video element has buffered, ordered like
/// `HTMLMediaElement.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Whether the element has pixels for the current playback position.
    pub fn has_current_data(&self) -> bool {
        *self >= ReadyState::HaveCurrentData
    }
}

/// The sink a camera stream is shown in and frames are read from.
///
/// The element only ever borrows the stream while attaching; the camera
/// manager stays its sole owner.
#[allow(async_fn_in_trait)]
pub trait VideoElement: Send + Sync + 'static {
    type Stream: MediaStream;

    /// Show `stream`, or detach when `None`.
    fn attach(&self, stream: Option<&Self::Stream>);

    async fn play(&self) -> Result<(), MediaError>;

    fn ready_state(&self) -> ReadyState;

    fn dimensions(&self) -> VideoDimensions;

    /// Copy the pixels of `region` of the current frame into `surface`, which
    /// the caller has already sized to the region.
    fn draw_region(&self, region: Region, surface: &mut FrameSample);
}
