//! The decode worker: a dedicated thread that owns the decode engine.
//!
//! Requests and responses travel over tokio channels. The thread announces
//! itself with [`WorkerResponse::Ready`] before reading any request, then
//! handles requests strictly one at a time.

use crate::{DecodeEngine, DecoderOptions, DecoderOptionsPatch, ImageInput, ScanResult, WorkerError, valid_results};
use qrscan_base::FrameSample;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRequest {
    /// Merge into the current options. The format list stays QR-only.
    Configure(DecoderOptionsPatch),
    /// Decode one frame. The sample is moved into the worker.
    Decode(FrameSample),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerResponse {
    Ready,
    /// Valid symbols only, corners clockwise from top left.
    Result(Vec<ScanResult>),
    Error(String),
}

/// Cloneable sending side of a [`DecodeWorker`].
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    requests: mpsc::UnboundedSender<WorkerRequest>,
}

impl WorkerHandle {
    pub fn post(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        self.requests
            .send(request)
            .map_err(|_| WorkerError::Disconnected)
    }

    pub fn configure(&self, patch: DecoderOptionsPatch) -> Result<(), WorkerError> {
        self.post(WorkerRequest::Configure(patch))
    }

    pub fn decode(&self, sample: FrameSample) -> Result<(), WorkerError> {
        self.post(WorkerRequest::Decode(sample))
    }

    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }
}

pub struct DecodeWorker {
    handle: Option<WorkerHandle>,
    responses: Option<mpsc::UnboundedReceiver<WorkerResponse>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for DecodeWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeWorker")
            .field("running", &self.handle.is_some())
            .field("responses_taken", &self.responses.is_none())
            .finish()
    }
}

impl DecodeWorker {
    /// Start the worker thread with `engine` and initial `options`.
    pub fn spawn<E>(engine: E, options: DecoderOptions) -> Self
    where
        E: DecodeEngine + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        let thread_handle = thread::Builder::new()
            .name("qrscan-decode".to_string())
            .spawn(move || run(engine, options.pinned(), request_rx, response_tx));
        let thread_handle = match thread_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                // The request receiver is dropped with the closure, so every
                // post reports Disconnected.
                log::error!("failed to spawn decode worker thread: {}", e);
                None
            }
        };

        Self {
            handle: Some(WorkerHandle {
                requests: request_tx,
            }),
            responses: Some(response_rx),
            thread_handle,
        }
    }

    /// A cloneable sender, or `None` once terminated.
    pub fn handle(&self) -> Option<WorkerHandle> {
        self.handle.clone()
    }

    pub fn post(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        match &self.handle {
            Some(handle) => handle.post(request),
            None => Err(WorkerError::Disconnected),
        }
    }

    pub fn configure(&self, patch: DecoderOptionsPatch) -> Result<(), WorkerError> {
        self.post(WorkerRequest::Configure(patch))
    }

    pub fn decode(&self, sample: FrameSample) -> Result<(), WorkerError> {
        self.post(WorkerRequest::Decode(sample))
    }

    /// Take the response stream, e.g. to drain it from a dispatch task.
    pub fn take_responses(&mut self) -> Option<mpsc::UnboundedReceiver<WorkerResponse>> {
        self.responses.take()
    }

    /// Receive the next response. `None` once the responses were taken or
    /// the worker has exited.
    pub async fn recv(&mut self) -> Option<WorkerResponse> {
        self.responses.as_mut()?.recv().await
    }

    /// Close the request channel. The thread exits after finishing the
    /// request it is working on; it is not joined.
    pub fn terminate(&mut self) {
        self.handle = None;
        if self.thread_handle.take().is_some() {
            log::debug!("decode worker terminated");
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn run<E: DecodeEngine>(
    mut engine: E,
    mut options: DecoderOptions,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
    responses: mpsc::UnboundedSender<WorkerResponse>,
) {
    if responses.send(WorkerResponse::Ready).is_err() {
        return;
    }

    while let Some(request) = requests.blocking_recv() {
        match request {
            WorkerRequest::Configure(patch) => {
                options.apply(&patch);
                log::debug!("decoder options updated: {:?}", options);
            }
            WorkerRequest::Decode(sample) => {
                let response = decode_frame(&mut engine, sample, &options);
                if responses.send(response).is_err() {
                    break;
                }
            }
        }
    }
    log::debug!("decode worker exiting");
}

fn decode_frame<E: DecodeEngine>(
    engine: &mut E,
    sample: FrameSample,
    options: &DecoderOptions,
) -> WorkerResponse {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        engine.read_barcodes(ImageInput::Pixels(sample), options)
    }));
    match outcome {
        Ok(Ok(symbols)) => WorkerResponse::Result(valid_results(&symbols)),
        Ok(Err(e)) => WorkerResponse::Error(e.to_string()),
        Err(payload) => WorkerResponse::Error(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "decode engine panicked".to_string()
    }
}
