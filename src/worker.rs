//! Request/response boundary to the pixel codec, on a dedicated thread.
//!
//! One [`CodecWorker`] is exclusively owned by one batch run. The thread is
//! spawned lazily on the first [`transform`](CodecWorker::transform) call and
//! reused for every image in the batch, so backend setup cost is paid once.
//!
//! The protocol is strictly one request in flight: `transform` takes
//! `&mut self`, sends the request, and blocks until the response arrives.
//! The worker thread has no internal queue. Pixel buffers are moved through
//! the channel in both directions, never copied.
//!
//! Failures inside the worker come back as typed errors on the response
//! channel, and the receive side uses a deadline, so a wedged or dead worker
//! surfaces as [`WorkerError::Timeout`] / [`WorkerError::Disconnected`]
//! instead of blocking the batch forever. A timed-out worker is abandoned,
//! never joined — teardown does not wait on the stuck backend call, and the
//! next `transform` starts a fresh thread, so a late response from the old
//! one can never answer a new request.

use crate::codec::{BackendError, CodecBackend, EncodeOptions, PixelBuffer};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("codec error: {0}")]
    Codec(#[from] BackendError),
    #[error("codec worker did not respond within {0:?}")]
    Timeout(Duration),
    #[error("codec worker thread is gone")]
    Disconnected,
}

/// One image's transform request: resize when the target differs from the
/// source, then JPEG-encode. The pixel buffer is consumed.
#[derive(Debug)]
pub struct TransformRequest {
    pub pixels: PixelBuffer,
    pub target_width: u32,
    pub target_height: u32,
    pub options: EncodeOptions,
}

/// Encoded bytes plus the dimensions actually used.
#[derive(Debug)]
pub struct TransformResponse {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

struct WorkerHandle {
    requests: Sender<TransformRequest>,
    responses: Receiver<Result<TransformResponse, BackendError>>,
    thread: JoinHandle<()>,
}

/// Handle to the codec thread. Exclusively owned by one batch run.
pub struct CodecWorker {
    backend: Arc<dyn CodecBackend>,
    timeout: Duration,
    handle: Option<WorkerHandle>,
}

impl CodecWorker {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(backend: Arc<dyn CodecBackend>) -> Self {
        Self::with_timeout(backend, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(backend: Arc<dyn CodecBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            handle: None,
        }
    }

    fn ensure_started(&mut self) -> &WorkerHandle {
        if self.handle.is_none() {
            let (req_tx, req_rx) = channel::<TransformRequest>();
            let (resp_tx, resp_rx) = channel();
            let backend = Arc::clone(&self.backend);
            let thread = std::thread::spawn(move || {
                while let Ok(request) = req_rx.recv() {
                    let result = serve(backend.as_ref(), request);
                    if resp_tx.send(result).is_err() {
                        break;
                    }
                }
            });
            self.handle = Some(WorkerHandle {
                requests: req_tx,
                responses: resp_rx,
                thread,
            });
        }
        self.handle.as_ref().unwrap()
    }

    /// Run one transform round trip. Blocks until the worker responds or the
    /// deadline passes.
    ///
    /// On a timeout the wedged thread is abandoned rather than joined; the
    /// next call starts a fresh worker, so the timed-out request's late
    /// response can never be served for a later request.
    pub fn transform(&mut self, request: TransformRequest) -> Result<TransformResponse, WorkerError> {
        let timeout = self.timeout;
        let received = {
            let handle = self.ensure_started();
            match handle.requests.send(request) {
                Ok(()) => handle.responses.recv_timeout(timeout),
                Err(_) => Err(RecvTimeoutError::Disconnected),
            }
        };
        match received {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(WorkerError::Codec(e)),
            Err(RecvTimeoutError::Timeout) => {
                self.abandon();
                Err(WorkerError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.shutdown();
                Err(WorkerError::Disconnected)
            }
        }
    }

    /// Walk away from a wedged worker: drop the handle without joining, so
    /// the caller is never held by a stuck backend call. The thread exits on
    /// its own once that call returns and its response send fails.
    fn abandon(&mut self) {
        self.handle = None;
    }

    /// Terminate the worker thread and release its resources. Idempotent;
    /// also runs on drop. Joins only a responsive thread — a worker abandoned
    /// after a timeout has no handle left to wait on.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle.requests);
            // The thread exits once its request channel closes.
            let _ = handle.thread.join();
        }
    }
}

impl Drop for CodecWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The work done on the worker thread for one request.
fn serve(
    backend: &dyn CodecBackend,
    request: TransformRequest,
) -> Result<TransformResponse, BackendError> {
    let TransformRequest {
        mut pixels,
        target_width,
        target_height,
        options,
    } = request;

    if target_width != pixels.width || target_height != pixels.height {
        pixels = backend.resize(pixels, target_width, target_height)?;
    }

    let (width, height) = (pixels.width, pixels.height);
    let bytes = backend.encode(pixels, &options)?;
    Ok(TransformResponse {
        bytes,
        width,
        height,
    })
}
