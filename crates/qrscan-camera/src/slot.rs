use crate::MediaStream;

/// Stop every track of `stream` and drop it.
pub fn dispose<S: MediaStream>(stream: S) {
    stream.stop_all();
}

/// The single live stream a camera manager may hold.
///
/// Streams enter through [`ActiveStream::replace`] and leave through
/// [`ActiveStream::release`]; a stream that is displaced or released always
/// has its tracks stopped.
#[derive(Debug)]
pub struct ActiveStream<S: MediaStream> {
    stream: Option<S>,
}

impl<S: MediaStream> Default for ActiveStream<S> {
    fn default() -> Self {
        Self { stream: None }
    }
}

impl<S: MediaStream> ActiveStream<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_some(&self) -> bool {
        self.stream.is_some()
    }

    pub fn get(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    pub fn video_track(&self) -> Option<&S::Track> {
        self.stream.as_ref().and_then(|s| s.video_track())
    }

    /// Install `stream`, disposing of whatever was held before.
    pub fn replace(&mut self, stream: S) {
        if let Some(previous) = self.stream.replace(stream) {
            log::warn!("replacing a live camera stream; stopping the old one");
            dispose(previous);
        }
    }

    /// Stop and drop the held stream. Returns whether there was one.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                dispose(stream);
                true
            }
            None => false,
        }
    }
}

impl<S: MediaStream> Drop for ActiveStream<S> {
    fn drop(&mut self) {
        self.release();
    }
}
