#![cfg(feature = "parallel")]

use frame_atlas_core::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_store(seed: u64) -> FrameStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = FrameStore::new(PixelFormat::Straight);
    for a in 0..6 {
        let name = format!("anim_{}", a);
        let frames = (0..10)
            .map(|i| {
                let w = rng.gen_range(1..=12u32);
                let h = rng.gen_range(1..=12u32);
                // Small palette so some frames repeat.
                let fill = rng.gen_range(0..3u8) * 80;
                let (w, h) = if fill == 0 { (4, 4) } else { (w, h) };
                Frame::new(
                    format!("{}/{}", name, i),
                    name.clone(),
                    w,
                    h,
                    vec![fill; (w * h * 4) as usize],
                )
            })
            .collect();
        store.add_animation(name, frames).unwrap();
    }
    store
}

#[test]
fn parallel_build_is_byte_identical_to_serial() {
    for seed in [1u64, 42, 2024] {
        let store = random_store(seed);
        let base = PackConfig::builder()
            .with_max_dimensions(32, 32)
            .padding(1)
            .allow_rotation(true);
        let serial = build_atlas(&store, &base.clone().parallel(false).build()).unwrap();
        let parallel = build_atlas(&store, &base.parallel(true).build()).unwrap();

        assert!(serial.sheet_count() > 1, "seed {} should spill over sheets", seed);
        assert!(serial.stats().num_duplicates > 0);
        assert_eq!(serial.entries(), parallel.entries());
        assert_eq!(serial.sheet_count(), parallel.sheet_count());
        for (a, b) in serial.sheets().iter().zip(parallel.sheets()) {
            assert_eq!(a.index, b.index);
            assert_eq!(a.image.dimensions(), b.image.dimensions());
            assert_eq!(a.pixels(), b.pixels());
        }
    }
}

#[test]
fn parallel_grouping_matches_serial() {
    let store = random_store(7);
    let frames = store.resolve().unwrap();
    let serial = frame_atlas_core::dedup::group_duplicates_with(&frames, false);
    let parallel = frame_atlas_core::dedup::group_duplicates_with(&frames, true);

    assert_eq!(serial.canonicals(), parallel.canonicals());
    let a: Vec<_> = serial.aliases().collect();
    let b: Vec<_> = parallel.aliases().collect();
    assert_eq!(a, b);
}
