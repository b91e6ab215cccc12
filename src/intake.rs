//! Input acquisition: turn CLI paths into an ordered batch of source images.
//!
//! This is the acceptance boundary in front of the pipeline: it expands
//! directories (sorted, one level of recursion via walkdir), filters on
//! supported image extensions, and enforces the per-file size ceiling and the
//! batch size ceiling before any bytes reach the transcoding core.

use crate::batch::SourceImage;
use crate::codec::SUPPORTED_INPUT_EXTENSIONS;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Most files accepted in one batch.
pub const MAX_BATCH_FILES: usize = 32;
/// Largest accepted input file, in bytes.
pub const MAX_FILE_BYTES: u64 = 50_000_000;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("{path} is not a supported image type")]
    UnsupportedFormat { path: PathBuf },
    #[error("{path} is {size} bytes; the limit is {MAX_FILE_BYTES}")]
    FileTooLarge { path: PathBuf, size: u64 },
    #[error("{count} files selected; the limit is {MAX_BATCH_FILES} per batch")]
    TooManyFiles { count: usize },
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SUPPORTED_INPUT_EXTENSIONS
                .iter()
                .any(|s| e.eq_ignore_ascii_case(s))
        })
}

/// Collect source images from a mix of file and directory paths.
///
/// Files must have a supported image extension; directories contribute every
/// supported image under them, in sorted path order. Ceilings are enforced
/// before any file is read.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<SourceImage>, IntakeError> {
    let mut files: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = Vec::new();
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| IntakeError::Walk {
                    path: path.clone(),
                    source: e,
                })?;
                if entry.file_type().is_file() && has_supported_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            files.extend(found);
        } else {
            if !has_supported_extension(path) {
                return Err(IntakeError::UnsupportedFormat { path: path.clone() });
            }
            files.push(path.clone());
        }
    }

    if files.len() > MAX_BATCH_FILES {
        return Err(IntakeError::TooManyFiles { count: files.len() });
    }

    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let size = std::fs::metadata(&path)?.len();
        if size > MAX_FILE_BYTES {
            return Err(IntakeError::FileTooLarge { path, size });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(&path)?;
        sources.push(SourceImage { name, bytes });
    }
    Ok(sources)
}
