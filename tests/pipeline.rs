//! End-to-end pipeline tests with the real pixel backend: session in,
//! deliverable on disk out.

use shrinkray::batch::SourceImage;
use shrinkray::codec::RustBackend;
use shrinkray::package::DiskTarget;
use shrinkray::session::{SessionController, SessionState};
use shrinkray::settings::BatchSettings;
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

/// A solid-color PNG of the given size, as encoded bytes.
fn png_source(name: &str, width: u32, height: u32) -> SourceImage {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 80, 40, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    SourceImage {
        name: name.into(),
        bytes: out.into_inner(),
    }
}

fn session_into(dir: &TempDir) -> SessionController<DiskTarget> {
    SessionController::new(
        Arc::new(RustBackend::new()),
        DiskTarget::new(dir.path()),
        None,
    )
}

#[test]
fn two_images_bounded_to_width_50_arrive_as_zip() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_into(&tmp);

    let settings = BatchSettings {
        quality: 75,
        max_width: 50,
        max_height: 0,
        prefix: "sm_".into(),
        ..Default::default()
    };
    session
        .submit(
            vec![
                png_source("one.png", 100, 100),
                png_source("two.png", 100, 100),
            ],
            &settings,
        )
        .unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    let zip_path = tmp.path().join("Compressed.zip");
    let mut archive = zip::ZipArchive::new(std::fs::File::open(zip_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);

    for (index, expected) in ["sm_one.jpeg", "sm_two.jpeg"].iter().enumerate() {
        let mut entry = archive.by_index(index).unwrap();
        assert_eq!(entry.name(), *expected);

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 50));
    }
}

#[test]
fn single_unbounded_image_arrives_as_itself_at_source_size() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_into(&tmp);

    session
        .submit(vec![png_source("photo.png", 200, 100)], &BatchSettings::default())
        .unwrap();

    let saved = std::fs::read(tmp.path().join("photo.jpeg")).unwrap();
    let decoded = image::load_from_memory(&saved).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 100));
}

#[test]
fn corrupt_input_is_skipped_while_the_rest_completes() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_into(&tmp);

    session
        .submit(
            vec![
                png_source("good.png", 40, 40),
                SourceImage {
                    name: "bad.png".into(),
                    bytes: b"not an image at all".to_vec(),
                },
            ],
            &BatchSettings::default(),
        )
        .unwrap();

    assert_eq!(session.outputs().len(), 1);
    assert_eq!(session.skipped().len(), 1);
    assert_eq!(session.skipped()[0].name, "bad.png");
    // One surviving output: delivered as the file itself, not a zip.
    assert!(tmp.path().join("good.jpeg").exists());
    assert!(!tmp.path().join("Compressed.zip").exists());
}

#[test]
fn resubmitting_replaces_the_previous_deliverable() {
    let tmp = TempDir::new().unwrap();
    let mut session = session_into(&tmp);

    session
        .submit(vec![png_source("a.png", 30, 30)], &BatchSettings::default())
        .unwrap();
    session
        .submit(vec![png_source("b.png", 30, 30)], &BatchSettings::default())
        .unwrap();

    assert_eq!(session.releases_performed(), 1);
    assert_eq!(session.deliverable().unwrap().filename(), "b.jpeg");
    assert!(tmp.path().join("b.jpeg").exists());
}
