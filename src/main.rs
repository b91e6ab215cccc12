use clap::Parser;
use shrinkray::codec::{FillColor, RustBackend};
use shrinkray::package::DiskTarget;
use shrinkray::session::SessionController;
use shrinkray::settings::SettingsStore;
use shrinkray::{intake, output};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "shrinkray")]
#[command(version)]
#[command(about = "Batch JPEG transcoder — resize and re-encode image sets")]
#[command(long_about = "\
Batch JPEG transcoder — resize and re-encode image sets

Hands every input image through the same pipeline: decode, flatten
transparency onto a background color, resize within the given bounds
(aspect ratio preserved), and re-encode as JPEG. One output is saved
as-is; several are bundled into Compressed.zip.

Bounds semantics:
  --max-width 0 / --max-height 0 (the default) means unconstrained on
  that axis. Both zero: no resize, inputs are still re-encoded.

Settings persistence:
  Flags you pass are saved to the settings file only with --keep; with
  --forget (or neither flag, on a fresh store) nothing is persisted and
  the next run starts from defaults.")]
struct Cli {
    /// Image files or directories containing them (up to 32 files, 50 MB each)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// JPEG quality 1-100 (0 = encoder default of 75)
    #[arg(short, long)]
    quality: Option<u32>,

    /// Maximum output width in pixels (0 = unconstrained)
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum output height in pixels (0 = unconstrained)
    #[arg(long)]
    max_height: Option<u32>,

    /// Prepended to every output filename
    #[arg(long)]
    prefix: Option<String>,

    /// Appended to every output filename (before .jpeg)
    #[arg(long)]
    suffix: Option<String>,

    /// Background color under transparent pixels
    #[arg(long, value_enum)]
    fill: Option<FillColor>,

    /// Remember these settings for future runs
    #[arg(long, conflicts_with = "forget")]
    keep: bool,

    /// Drop any remembered settings
    #[arg(long)]
    forget: bool,

    /// Directory the deliverable is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Settings file location
    #[arg(long, default_value = ".shrinkray.toml")]
    settings_file: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = SettingsStore::new(&cli.settings_file);
    let mut settings = store.load();
    if let Some(quality) = cli.quality {
        settings.quality = quality;
    }
    if let Some(width) = cli.max_width {
        settings.max_width = width;
    }
    if let Some(height) = cli.max_height {
        settings.max_height = height;
    }
    if let Some(prefix) = cli.prefix {
        settings.prefix = prefix;
    }
    if let Some(suffix) = cli.suffix {
        settings.suffix = suffix;
    }
    if let Some(fill) = cli.fill {
        settings.fill_color = fill;
    }
    if cli.keep {
        settings.keep_settings = true;
    }
    if cli.forget {
        settings.keep_settings = false;
    }
    store.persist(&settings)?;

    let sources = intake::collect_sources(&cli.paths)?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            if let Some(line) = output::format_progress_event(&event) {
                println!("{}", line);
            }
        }
    });

    let mut session = SessionController::new(
        Arc::new(RustBackend::new()),
        DiskTarget::new(&cli.output),
        Some(tx),
    );
    let result = session.submit(sources, &settings);

    let snapshot = session.progress();
    let summary = output::format_summary(
        snapshot.completed,
        session.skipped(),
        &snapshot.elapsed,
        session.deliverable().map(|d| d.filename()),
    );

    // Dropping the session closes the event channel and ends the printer.
    drop(session);
    printer.join().unwrap();

    result?;
    for line in summary {
        println!("{}", line);
    }
    Ok(())
}
