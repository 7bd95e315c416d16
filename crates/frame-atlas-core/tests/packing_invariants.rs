use frame_atlas_core::prelude::*;
use rand::{Rng, SeedableRng};

fn random_inputs(seed: u64, n: usize, max_side: u32) -> Vec<PackInput> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let w = rng.gen_range(1..=max_side);
            let h = rng.gen_range(1..=max_side);
            PackInput::new(format!("r{:03}", i), w, h)
        })
        .collect()
}

fn padded(r: &Rect, pad: u32) -> Rect {
    Rect::new(r.x, r.y, r.w + pad, r.h + pad)
}

fn assert_valid(layout: &Layout, inputs: &[PackInput], cfg: &PackConfig) {
    assert_eq!(layout.placements.len(), inputs.len());
    for (p, input) in layout.placements.iter().zip(inputs) {
        let size = layout.sheets[p.sheet];
        assert!(size.width <= cfg.max_width && size.height <= cfg.max_height);
        assert!(p.rect.x + p.rect.w <= size.width, "{:?} outside sheet {:?}", p, size);
        assert!(p.rect.y + p.rect.h <= size.height, "{:?} outside sheet {:?}", p, size);
        let (w, h) = if p.rotated { (input.h, input.w) } else { (input.w, input.h) };
        assert_eq!((p.rect.w, p.rect.h), (w, h));
    }
    for i in 0..layout.placements.len() {
        for j in (i + 1)..layout.placements.len() {
            let a = &layout.placements[i];
            let b = &layout.placements[j];
            if a.sheet != b.sheet {
                continue;
            }
            assert!(
                !padded(&a.rect, cfg.padding).intersects(&padded(&b.rect, cfg.padding)),
                "{:?} and {:?} overlap",
                a,
                b
            );
        }
    }
}

#[test]
fn random_sets_are_disjoint_and_in_bounds() {
    let cfg = PackConfig::builder().with_max_dimensions(256, 256).build();
    let inputs = random_inputs(42, 150, 48);
    let layout = pack_rects(&inputs, &cfg).expect("pack");
    assert_valid(&layout, &inputs, &cfg);
}

#[test]
fn padding_keeps_rects_apart() {
    let cfg = PackConfig::builder()
        .with_max_dimensions(128, 128)
        .padding(3)
        .build();
    let inputs = random_inputs(7, 60, 24);
    let layout = pack_rects(&inputs, &cfg).expect("pack");
    assert_valid(&layout, &inputs, &cfg);
}

#[test]
fn rotation_and_other_split_rules_stay_valid() {
    for split in [
        SplitRule::ShorterLeftoverAxis,
        SplitRule::LongerLeftoverAxis,
        SplitRule::MinimizeArea,
        SplitRule::MaximizeArea,
        SplitRule::ShorterAxis,
        SplitRule::LongerAxis,
    ] {
        let cfg = PackConfig::builder()
            .with_max_dimensions(200, 120)
            .allow_rotation(true)
            .padding(1)
            .split(split)
            .build();
        let inputs = random_inputs(1234, 80, 40);
        let layout = pack_rects(&inputs, &cfg).expect("pack");
        assert_valid(&layout, &inputs, &cfg);
    }
}

#[test]
fn overflow_opens_new_sheets_when_allowed() {
    let cfg = PackConfig::builder().with_max_dimensions(32, 32).build();
    let inputs = vec![
        PackInput::new("a", 20, 20),
        PackInput::new("b", 20, 20),
        PackInput::new("c", 20, 20),
    ];
    let layout = pack_rects(&inputs, &cfg).expect("pack");
    assert_eq!(layout.sheet_count(), 3);
    let sheets: Vec<usize> = layout.placements.iter().map(|p| p.sheet).collect();
    assert_eq!(sheets, vec![0, 1, 2]);
    for s in &layout.sheets {
        assert_eq!((s.width, s.height), (20, 20));
    }
    assert_valid(&layout, &inputs, &cfg);
}

#[test]
fn later_small_rects_backfill_earlier_sheets() {
    let cfg = PackConfig::builder().with_max_dimensions(32, 32).build();
    let inputs = vec![
        PackInput::new("big0", 30, 30),
        PackInput::new("big1", 30, 30),
        PackInput::new("small", 2, 2),
    ];
    let layout = pack_rects(&inputs, &cfg).expect("pack");
    assert_eq!(layout.sheet_count(), 2);
    assert_eq!(layout.placements[2].sheet, 0);
    assert_valid(&layout, &inputs, &cfg);
}

#[test]
fn power_of_two_sheets() {
    let cfg = PackConfig::builder()
        .with_max_dimensions(256, 256)
        .pow2(true)
        .build();
    let inputs = random_inputs(99, 20, 30);
    let layout = pack_rects(&inputs, &cfg).expect("pack");
    for s in &layout.sheets {
        assert!(s.width.is_power_of_two() && s.height.is_power_of_two());
    }
    assert_valid(&layout, &inputs, &cfg);
}

#[test]
fn sheet_is_tight_bounding_box() {
    let cfg = PackConfig::builder().with_max_dimensions(512, 512).build();
    let inputs = vec![PackInput::new("a", 10, 7), PackInput::new("b", 5, 7)];
    let layout = pack_rects(&inputs, &cfg).expect("pack");
    assert_eq!(layout.sheet_count(), 1);
    // best-area-fit prefers the 10px column left under "a"
    assert_eq!(layout.placements[1].rect, Rect::new(0, 7, 5, 7));
    assert_eq!((layout.sheets[0].width, layout.sheets[0].height), (10, 14));
}
