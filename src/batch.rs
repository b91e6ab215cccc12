//! The per-batch transcoding loop.
//!
//! Takes an ordered set of source images and one settings snapshot, and
//! produces re-encoded JPEG outputs in the same order. Images are processed
//! strictly sequentially — one decode, one worker round trip, one output at a
//! time — trading throughput for bounded memory and simple progress
//! accounting. Exactly one [`CodecWorker`] exists per invocation and is shut
//! down on every exit path.
//!
//! ## Failure policy
//!
//! A failed decode or dimension resolution affects only that item: it is
//! recorded in [`BatchOutput::skipped`] and the loop continues. A failure at
//! the worker boundary (encode error, timeout, dead thread) aborts the whole
//! batch, because the boundary is broken for every remaining item too; the
//! worker is torn down before the error is returned.

use crate::codec::CodecBackend;
use crate::dimensions;
use crate::progress::ProgressTracker;
use crate::settings::BatchSettings;
use crate::worker::{CodecWorker, TransformRequest, WorkerError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// MIME type of every produced file.
pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("no images to process")]
    Empty,
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// One input image: its filename and raw (still encoded) bytes.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One finished output: encoded JPEG bytes plus the dimensions actually used.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// An input that was skipped by the per-item failure policy.
#[derive(Debug, Clone)]
pub struct SkippedImage {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchOutput {
    pub files: Vec<OutputFile>,
    pub skipped: Vec<SkippedImage>,
}

/// Output filename stem: prefix + basename without extension + suffix.
///
/// The basename is everything before the last dot. A name with no dot, or
/// with only a leading dot (`.hidden`), deliberately keeps its full form —
/// a strict split would leave an empty basename there.
pub fn final_stem(name: &str, prefix: &str, suffix: &str) -> String {
    let base = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    format!("{prefix}{base}{suffix}")
}

/// Run one batch to completion.
///
/// Outputs preserve input order. `progress` receives one completion (or skip)
/// per input; the caller owns the batch clock around this call.
pub fn run_batch(
    backend: &Arc<dyn CodecBackend>,
    worker_timeout: Duration,
    sources: Vec<SourceImage>,
    settings: &BatchSettings,
    progress: &ProgressTracker,
) -> Result<BatchOutput, BatchError> {
    if sources.is_empty() {
        return Err(BatchError::Empty);
    }

    let mut worker = CodecWorker::with_timeout(Arc::clone(backend), worker_timeout);
    let options = settings.encode_options();
    let mut output = BatchOutput::default();

    for source in sources {
        let pixels = match backend.decode_over_fill(&source.bytes, settings.fill_color) {
            Ok(pixels) => pixels,
            Err(e) => {
                progress.record_skipped(&source.name, &e.to_string());
                output.skipped.push(SkippedImage {
                    name: source.name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let (target_width, target_height) = match dimensions::resolve(
            pixels.width,
            pixels.height,
            settings.max_width,
            settings.max_height,
        ) {
            Ok(dims) => dims,
            Err(e) => {
                progress.record_skipped(&source.name, &e.to_string());
                output.skipped.push(SkippedImage {
                    name: source.name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let response = match worker.transform(TransformRequest {
            pixels,
            target_width,
            target_height,
            options,
        }) {
            Ok(response) => response,
            Err(e) => {
                worker.shutdown();
                return Err(e.into());
            }
        };

        let name = format!(
            "{}.jpeg",
            final_stem(&source.name, &settings.prefix, &settings.suffix)
        );
        progress.record_completed(&name);
        output.files.push(OutputFile {
            name,
            bytes: response.bytes,
            width: response.width,
            height: response.height,
        });
    }

    worker.shutdown();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::backend::tests::{MockBackend, RecordedOp, gray_pixels};
    use crate::codec::{BackendError, CodecBackend, EncodeOptions, FillColor, PixelBuffer};

    fn source(name: &str) -> SourceImage {
        SourceImage {
            name: name.into(),
            bytes: vec![1, 2, 3],
        }
    }

    fn settings() -> BatchSettings {
        BatchSettings {
            quality: 75,
            ..Default::default()
        }
    }

    fn run(
        backend: Arc<dyn CodecBackend>,
        sources: Vec<SourceImage>,
        settings: &BatchSettings,
    ) -> Result<BatchOutput, BatchError> {
        let progress = ProgressTracker::new(None);
        run_batch(
            &backend,
            CodecWorker::DEFAULT_TIMEOUT,
            sources,
            settings,
            &progress,
        )
    }

    #[test]
    fn final_stem_applies_prefix_and_suffix() {
        assert_eq!(final_stem("photo.png", "sm_", "_web"), "sm_photo_web");
        assert_eq!(final_stem("photo.png", "", ""), "photo");
        assert_eq!(final_stem("archive.tar.gz", "", ""), "archive.tar");
        assert_eq!(final_stem("noext", "x_", ""), "x_noext");
        assert_eq!(final_stem(".hidden", "", ""), ".hidden");
    }

    #[test]
    fn empty_batch_rejected_before_any_work() {
        let backend = Arc::new(MockBackend::new());
        let result = run(backend.clone(), vec![], &settings());
        assert!(matches!(result, Err(BatchError::Empty)));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn outputs_preserve_input_order_and_naming() {
        let backend = Arc::new(MockBackend::with_decodes(vec![
            Ok(gray_pixels(100, 100)),
            Ok(gray_pixels(100, 100)),
        ]));
        let mut s = settings();
        s.max_width = 50;
        s.prefix = "sm_".into();

        let output = run(
            backend,
            vec![source("first.png"), source("second.png")],
            &s,
        )
        .unwrap();

        let names: Vec<&str> = output.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["sm_first.jpeg", "sm_second.jpeg"]);
        assert!(output.skipped.is_empty());
        for file in &output.files {
            assert_eq!((file.width, file.height), (50, 50));
        }
    }

    #[test]
    fn no_bounds_means_no_resize_request() {
        let backend = Arc::new(MockBackend::with_decodes(vec![Ok(gray_pixels(200, 100))]));
        let output = run(backend.clone(), vec![source("wide.png")], &settings()).unwrap();

        assert_eq!(output.files.len(), 1);
        assert_eq!((output.files[0].width, output.files[0].height), (200, 100));
        // Decode and encode only: the worker saw matching dimensions.
        let ops = backend.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Resize { .. })));
    }

    #[test]
    fn bad_image_is_skipped_and_batch_continues() {
        let backend = Arc::new(MockBackend::with_decodes(vec![
            Ok(gray_pixels(10, 10)),
            Err("corrupt".into()),
            Ok(gray_pixels(10, 10)),
        ]));
        let output = run(
            backend,
            vec![source("a.png"), source("bad.png"), source("c.png")],
            &settings(),
        )
        .unwrap();

        assert_eq!(output.files.len(), 2);
        assert_eq!(output.skipped.len(), 1);
        assert_eq!(output.skipped[0].name, "bad.png");
        let names: Vec<&str> = output.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.jpeg", "c.jpeg"]);
    }

    #[test]
    fn progress_counts_completions_not_skips() {
        let backend: Arc<dyn CodecBackend> = Arc::new(MockBackend::with_decodes(vec![
            Ok(gray_pixels(10, 10)),
            Err("corrupt".into()),
        ]));
        let mut progress = ProgressTracker::new(None);
        progress.start_batch(2);
        run_batch(
            &backend,
            CodecWorker::DEFAULT_TIMEOUT,
            vec![source("a.png"), source("bad.png")],
            &settings(),
            &progress,
        )
        .unwrap();
        progress.finish();
        assert_eq!(progress.snapshot().completed, 1);
    }

    /// Encode fails on every request.
    struct BrokenEncoder;
    impl CodecBackend for BrokenEncoder {
        fn decode_over_fill(&self, _: &[u8], _: FillColor) -> Result<PixelBuffer, BackendError> {
            Ok(gray_pixels(10, 10))
        }
        fn resize(&self, p: PixelBuffer, _: u32, _: u32) -> Result<PixelBuffer, BackendError> {
            Ok(p)
        }
        fn encode(&self, _: PixelBuffer, _: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
            Err(BackendError::EncodeFailed("boom".into()))
        }
    }

    #[test]
    fn worker_failure_aborts_the_batch() {
        let result = run(
            Arc::new(BrokenEncoder),
            vec![source("a.png"), source("b.png")],
            &settings(),
        );
        assert!(matches!(result, Err(BatchError::Worker(_))));
    }

    /// Encoder wedged far longer than any worker timeout in the test.
    struct WedgedEncoder(Duration);
    impl CodecBackend for WedgedEncoder {
        fn decode_over_fill(&self, _: &[u8], _: FillColor) -> Result<PixelBuffer, BackendError> {
            Ok(gray_pixels(10, 10))
        }
        fn resize(&self, p: PixelBuffer, _: u32, _: u32) -> Result<PixelBuffer, BackendError> {
            Ok(p)
        }
        fn encode(&self, p: PixelBuffer, _: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
            std::thread::sleep(self.0);
            Ok(p.data)
        }
    }

    #[test]
    fn wedged_worker_aborts_the_batch_within_its_timeout() {
        let progress = ProgressTracker::new(None);
        let backend: Arc<dyn CodecBackend> = Arc::new(WedgedEncoder(Duration::from_secs(5)));

        let begin = std::time::Instant::now();
        let result = run_batch(
            &backend,
            Duration::from_millis(25),
            vec![source("a.png"), source("b.png")],
            &settings(),
            &progress,
        );
        assert!(matches!(
            result,
            Err(BatchError::Worker(WorkerError::Timeout(_)))
        ));
        // The abort must not wait on the stuck backend call.
        assert!(
            begin.elapsed() < Duration::from_millis(500),
            "abort took {:?} with a 25ms worker timeout",
            begin.elapsed()
        );
    }
}
