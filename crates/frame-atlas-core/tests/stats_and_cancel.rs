use frame_atlas_core::prelude::*;
use std::sync::atomic::AtomicBool;

fn solid(id: &str, w: u32, h: u32, v: u8) -> Frame {
    Frame::new(id, "", w, h, vec![v; (w * h * 4) as usize])
}

fn store() -> FrameStore {
    let mut store = FrameStore::new(PixelFormat::Straight);
    store
        .add_animation(
            "blink",
            vec![solid("blink/0", 8, 8, 1), solid("blink/1", 8, 8, 2), solid("blink/2", 8, 8, 1)],
        )
        .unwrap();
    store
}

#[test]
fn stats_count_unique_and_duplicate_frames() {
    let atlas = build_atlas(&store(), &PackConfig::default()).unwrap();
    let stats = atlas.stats();
    assert_eq!(stats.num_sheets, 1);
    assert_eq!(stats.num_frames, 3);
    assert_eq!(stats.num_unique, 2);
    assert_eq!(stats.num_duplicates, 1);
    assert_eq!(stats.used_area, 128);
    assert_eq!(stats.total_sheet_area, 128);
    assert!((stats.occupancy - 1.0).abs() < f64::EPSILON);
    assert_eq!(stats.wasted_area(), 0);
    assert!(stats.summary().contains("1 duplicates"));
}

#[test]
fn cancelled_build_produces_no_atlas() {
    let cancel = AtomicBool::new(true);
    let result = build_atlas_with_cancel(&store(), &PackConfig::default(), &cancel);
    assert!(matches!(result, Err(AtlasError::Cancelled)));

    let go = AtomicBool::new(false);
    assert!(build_atlas_with_cancel(&store(), &PackConfig::default(), &go).is_ok());
}

#[test]
fn atlas_can_be_shared_across_threads() {
    let atlas = std::sync::Arc::new(build_atlas(&store(), &PackConfig::default()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let atlas = atlas.clone();
            std::thread::spawn(move || atlas.entry("blink/2").map(|e| e.rect))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), atlas.entry("blink/0").map(|e| e.rect));
    }
}
