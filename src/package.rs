//! Deliverable assembly and delivery.
//!
//! One output is delivered as that file verbatim; two or more are wrapped in
//! a zip archive named [`ARCHIVE_NAME`] with every member at the archive
//! root, in processing order. The members are already JPEG-compressed, so the
//! archive uses the format's stock deflate settings.
//!
//! A [`Deliverable`] owns the transient bytes behind the download. The bytes
//! are released exactly once via [`Deliverable::release`]; further calls are
//! guarded no-ops, and the release count is observable so lifecycle bugs show
//! up in tests rather than as leaks.

use crate::batch::OutputFile;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Suggested filename when the deliverable is an archive.
pub const ARCHIVE_NAME: &str = "Compressed.zip";

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("nothing to package")]
    Empty,
    #[error("archive build failed: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("native share is not available on this host")]
    ShareUnsupported,
    #[error("deliverable was already released")]
    Released,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A releasable handle to downloadable bytes with a suggested filename.
#[derive(Debug)]
pub struct Deliverable {
    filename: String,
    bytes: Option<Vec<u8>>,
    release_count: u32,
}

impl Deliverable {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The underlying bytes, or `None` after release.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn is_released(&self) -> bool {
        self.bytes.is_none()
    }

    /// Free the transient bytes. Safe to call more than once; only the first
    /// call does anything.
    pub fn release(&mut self) {
        if self.bytes.take().is_some() {
            self.release_count += 1;
        }
    }

    /// How many times `release` actually released (0 or 1).
    pub fn release_count(&self) -> u32 {
        self.release_count
    }
}

/// Build the deliverable for a finished batch.
///
/// Exactly one output wraps that file directly (same bytes, same name); more
/// than one builds a zip of all outputs.
pub fn package(outputs: &[OutputFile]) -> Result<Deliverable, PackageError> {
    match outputs {
        [] => Err(PackageError::Empty),
        [single] => Ok(Deliverable {
            filename: single.name.clone(),
            bytes: Some(single.bytes.clone()),
            release_count: 0,
        }),
        many => {
            let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
            let entry_options = SimpleFileOptions::default();
            for file in many {
                writer.start_file(&file.name, entry_options)?;
                writer.write_all(&file.bytes)?;
            }
            let archive = writer.finish()?.into_inner();
            Ok(Deliverable {
                filename: ARCHIVE_NAME.to_string(),
                bytes: Some(archive),
                release_count: 0,
            })
        }
    }
}

/// Where finished bytes go: native share on standalone hosts, a plain save
/// everywhere else.
pub trait DeliveryTarget {
    /// Whether the host behaves like an installed/standalone application.
    fn is_standalone(&self) -> bool;

    /// Hand the raw output files to the host's native share facility.
    fn share(&self, files: &[OutputFile]) -> Result<(), DeliveryError>;

    /// Save the deliverable through its transient reference.
    fn save(&self, deliverable: &Deliverable) -> Result<(), DeliveryError>;
}

/// Deliver to the target: standalone hosts get a share attempt first, and any
/// share failure falls back to the save path. Share failure is never a hard
/// error.
pub fn deliver(
    target: &dyn DeliveryTarget,
    deliverable: &Deliverable,
    files: &[OutputFile],
) -> Result<(), DeliveryError> {
    if target.is_standalone() && target.share(files).is_ok() {
        return Ok(());
    }
    target.save(deliverable)
}

/// Stock target: saves the deliverable into a directory on disk. Not a
/// standalone host, so it never shares.
pub struct DiskTarget {
    dir: std::path::PathBuf,
}

impl DiskTarget {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DeliveryTarget for DiskTarget {
    fn is_standalone(&self) -> bool {
        false
    }

    fn share(&self, _files: &[OutputFile]) -> Result<(), DeliveryError> {
        Err(DeliveryError::ShareUnsupported)
    }

    fn save(&self, deliverable: &Deliverable) -> Result<(), DeliveryError> {
        let bytes = deliverable.bytes().ok_or(DeliveryError::Released)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(deliverable.filename()), bytes)?;
        Ok(())
    }
}
