//! Top-level session state: one live batch at a time.
//!
//! The controller composes the batch loop, progress tracking, packaging and
//! delivery behind a small state machine:
//!
//! ```text
//! Idle → Processing → Ready → (Idle | Processing)
//! ```
//!
//! At most one deliverable is ever live. Submitting while a prior deliverable
//! exists *supersedes* it — the old transient bytes are released (exactly
//! once) and progress is reset before any new work begins. There is no
//! queueing and no cancellation: a running batch finishes or fails.

use crate::batch::{self, BatchError, OutputFile, SkippedImage, SourceImage};
use crate::codec::CodecBackend;
use crate::package::{self, Deliverable, DeliveryError, DeliveryTarget, PackageError};
use crate::progress::{ProgressEvent, ProgressSnapshot, ProgressTracker};
use crate::settings::BatchSettings;
use crate::worker::CodecWorker;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("you have to select some images to compress first")]
    EmptyBatch,
    #[error(transparent)]
    Batch(BatchError),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Processing,
    Ready,
}

/// Composes the pipeline around one live batch.
pub struct SessionController<T: DeliveryTarget> {
    backend: Arc<dyn CodecBackend>,
    target: T,
    progress: ProgressTracker,
    state: SessionState,
    outputs: Vec<OutputFile>,
    skipped: Vec<SkippedImage>,
    deliverable: Option<Deliverable>,
    releases_performed: u32,
    worker_timeout: Duration,
}

impl<T: DeliveryTarget> SessionController<T> {
    pub fn new(
        backend: Arc<dyn CodecBackend>,
        target: T,
        events: Option<Sender<ProgressEvent>>,
    ) -> Self {
        Self {
            backend,
            target,
            progress: ProgressTracker::new(events),
            state: SessionState::Idle,
            outputs: Vec::new(),
            skipped: Vec::new(),
            deliverable: None,
            releases_performed: 0,
            worker_timeout: CodecWorker::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_worker_timeout(mut self, timeout: Duration) -> Self {
        self.worker_timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    pub fn deliverable(&self) -> Option<&Deliverable> {
        self.deliverable.as_ref()
    }

    /// Per-image outputs of the last batch. Preserved even when packaging
    /// fails, so a user is never forced to re-process.
    pub fn outputs(&self) -> &[OutputFile] {
        &self.outputs
    }

    pub fn skipped(&self) -> &[SkippedImage] {
        &self.skipped
    }

    /// Total number of transient-reference releases this controller has
    /// performed across its lifetime.
    pub fn releases_performed(&self) -> u32 {
        self.releases_performed
    }

    /// Run a batch: supersedes any prior deliverable, processes every image,
    /// packages the result, and — on non-standalone hosts — delivers it once.
    ///
    /// An empty submission is rejected with no state change and no resources
    /// allocated.
    pub fn submit(
        &mut self,
        images: Vec<SourceImage>,
        settings: &BatchSettings,
    ) -> Result<(), SessionError> {
        if images.is_empty() {
            return Err(SessionError::EmptyBatch);
        }

        self.retire();
        self.state = SessionState::Processing;
        self.progress.start_batch(images.len());

        let result = batch::run_batch(
            &self.backend,
            self.worker_timeout,
            images,
            settings,
            &self.progress,
        );
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                self.progress.reset();
                self.state = SessionState::Idle;
                return Err(SessionError::Batch(e));
            }
        };
        // The last result has arrived: the clock stops here, even though
        // packaging and delivery still follow.
        self.progress.finish();

        self.outputs = output.files;
        self.skipped = output.skipped;

        let deliverable = match package::package(&self.outputs) {
            Ok(deliverable) => deliverable,
            Err(e) => {
                // Outputs stay cached; only the packaging step failed.
                self.state = SessionState::Idle;
                return Err(e.into());
            }
        };
        self.deliverable = Some(deliverable);
        self.state = SessionState::Ready;

        if !self.target.is_standalone() {
            self.deliver()?;
        }
        Ok(())
    }

    /// Deliver the current deliverable (share on standalone hosts, save
    /// otherwise). Only valid in the Ready state.
    pub fn deliver(&mut self) -> Result<(), SessionError> {
        let Some(deliverable) = self.deliverable.as_ref() else {
            return Err(SessionError::Delivery(DeliveryError::Released));
        };
        package::deliver(&self.target, deliverable, &self.outputs)?;
        Ok(())
    }

    /// Explicit dismissal: release everything and return to Idle.
    pub fn dismiss(&mut self) {
        self.retire();
        self.state = SessionState::Idle;
    }

    /// Release the prior deliverable (exactly once), drop cached outputs and
    /// reset progress and timer.
    fn retire(&mut self) {
        if let Some(mut deliverable) = self.deliverable.take() {
            deliverable.release();
            self.releases_performed += deliverable.release_count();
        }
        self.outputs.clear();
        self.skipped.clear();
        self.progress.reset();
    }
}
