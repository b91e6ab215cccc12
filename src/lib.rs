//! # Shrinkray
//!
//! A batch JPEG transcoder: hand it a set of images and it re-encodes each
//! one — optionally resized within max-width/max-height bounds — and delivers
//! the result as a single file or a `Compressed.zip` archive. Everything runs
//! locally; no image byte ever leaves the machine.
//!
//! # Architecture: One Batch, One Worker
//!
//! A batch flows through the crate like this:
//!
//! ```text
//! caller → session::submit(images, settings)
//!            → batch loop: decode → dimensions::resolve → worker round trip
//!            → package: single file or zip
//!            → delivery: share or save
//! ```
//!
//! Images are processed strictly sequentially through a single codec worker
//! thread with exactly one request in flight. This is deliberate: memory
//! stays bounded at roughly one decoded bitmap, output order trivially equals
//! input order, and the progress counter is a plain increment. Throughput is
//! the trade; batches are capped at 32 files, so it is a good one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dimensions`] | Pure output-size math: bounds, aspect ratio, clamping |
//! | [`codec`] | Pixel work behind a trait: decode, flatten, resize, JPEG encode |
//! | [`worker`] | The codec on its own thread — request/response, timeout, teardown |
//! | [`batch`] | The per-image loop: filenames, skip policy, progress |
//! | [`progress`] | Completed/total counters and the `MM:SS` ticker |
//! | [`package`] | Deliverable assembly (file or zip) and share/save delivery |
//! | [`session`] | Top-level state machine: submit, supersede, dismiss |
//! | [`settings`] | `BatchSettings` and their keep-flag-gated TOML persistence |
//! | [`intake`] | CLI input acquisition: discovery, ceilings, byte loading |
//! | [`output`] | CLI line formatting — pure functions, printing in the binary |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! All pixel work goes through the `image` crate: pure-Rust decoders,
//! Lanczos3 resampling, baseline JPEG encoding. No ImageMagick, no system
//! libraries — the binary is fully self-contained.
//!
//! ## Failures Are Typed, Never Hung
//!
//! The codec worker answers every request with a `Result`, and the caller
//! waits with a deadline. A corrupt image skips that one item; a broken or
//! wedged worker fails the batch with a typed error. A wedged thread is
//! abandoned rather than joined, so teardown never waits on the stuck call.
//! No failure mode leaves the batch waiting forever.
//!
//! ## Supersede, Don't Queue
//!
//! The session holds at most one live batch. Submitting while a finished
//! batch is still waiting to be dismissed releases the old deliverable
//! (exactly once) and starts over. There is no queue and no cancellation —
//! small batches finish fast enough that neither earns its complexity.

pub mod batch;
pub mod codec;
pub mod dimensions;
pub mod intake;
pub mod output;
pub mod package;
pub mod progress;
pub mod session;
pub mod settings;
pub mod worker;
