use frame_atlas_core::prelude::*;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("frame-atlas-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn small_atlas() -> Atlas {
    let mut store = FrameStore::new(PixelFormat::Straight);
    store
        .add_animation(
            "blink",
            vec![
                Frame::new("blink/0", "blink", 3, 2, vec![200; 3 * 2 * 4]),
                Frame::new("blink/1", "blink", 2, 2, vec![40; 2 * 2 * 4]),
            ],
        )
        .unwrap();
    build_atlas(&store, &PackConfig::builder().with_max_dimensions(64, 64).build()).unwrap()
}

#[test]
fn saved_sheets_reload_with_identical_pixels() {
    let atlas = small_atlas();
    let dir = scratch_dir("reload");
    let names = sheet_file_names("atlas", atlas.sheet_count());

    let written = atlas.save_sheets(&dir, &names).unwrap();
    assert_eq!(written, vec![dir.join("atlas.png")]);

    let reloaded = image::open(&written[0]).unwrap().to_rgba8();
    let sheet = atlas.sheet(0).unwrap();
    assert_eq!(reloaded.dimensions(), (sheet.width(), sheet.height()));
    assert_eq!(reloaded.as_raw(), sheet.image.as_raw());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_extension_is_an_image_error() {
    let atlas = small_atlas();
    let dir = scratch_dir("badext");

    let err = atlas
        .save_sheets(&dir, &["atlas.notanimage".to_string()])
        .unwrap_err();
    assert!(matches!(err, AtlasError::Image(_)), "got {:?}", err);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn sheet_name_count_must_match() {
    let atlas = small_atlas();
    let dir = scratch_dir("count");

    let err = atlas.save_sheets(&dir, &[]).unwrap_err();
    assert!(matches!(err, AtlasError::InvalidInput(_)));
    assert!(!dir.exists());
}

#[test]
fn unwritable_target_is_an_io_error() {
    let atlas = small_atlas();
    let dir = scratch_dir("io");
    // A regular file where the output directory should be.
    std::fs::write(&dir, b"not a directory").unwrap();

    let err = atlas
        .save_sheets(&dir, &sheet_file_names("atlas", 1))
        .unwrap_err();
    assert!(matches!(err, AtlasError::Io(_)), "got {:?}", err);

    let _ = std::fs::remove_file(&dir);
}
