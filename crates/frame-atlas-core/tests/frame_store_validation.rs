use frame_atlas_core::prelude::*;

#[test]
fn short_pixel_buffer_is_rejected_on_insert() {
    let mut store = FrameStore::new(PixelFormat::Straight);
    let frame = Frame::new("bad", "anim", 4, 4, vec![0; 4 * 4 * 4 - 1]);
    match store.insert_frame(frame) {
        Err(AtlasError::InvalidFrameData {
            frame,
            expected,
            actual,
        }) => {
            assert_eq!(frame, "bad");
            assert_eq!(expected, 64);
            assert_eq!(actual, 63);
        }
        other => panic!("expected InvalidFrameData, got {:?}", other),
    }
    assert!(store.is_empty());
}

#[test]
fn bad_frame_in_animation_fails_fast() {
    let mut store = FrameStore::new(PixelFormat::Straight);
    let err = store
        .add_animation(
            "run",
            vec![
                Frame::new("run/0", "", 2, 2, vec![0; 16]),
                Frame::new("run/1", "", 2, 2, vec![0; 17]),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, AtlasError::InvalidFrameData { .. }));
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut store = FrameStore::new(PixelFormat::Straight);
    store
        .insert_frame(Frame::new("dup", "a", 1, 1, vec![0; 4]))
        .unwrap();
    let err = store
        .insert_frame(Frame::new("dup", "b", 1, 1, vec![1; 4]))
        .unwrap_err();
    assert!(matches!(err, AtlasError::InvalidInput(_)));
    assert_eq!(store.len(), 1);
}

#[test]
fn unknown_frame_reference_fails_the_build() {
    let mut store = FrameStore::new(PixelFormat::Straight);
    store
        .insert_frame(Frame::new("known", "a", 1, 1, vec![0; 4]))
        .unwrap();
    store.push_group(AnimationGroup::new(
        "a",
        vec!["known".into(), "missing".into()],
    ));
    let err = build_atlas(&store, &PackConfig::default()).unwrap_err();
    match err {
        AtlasError::InvalidInput(msg) => assert!(msg.contains("missing")),
        other => panic!("expected InvalidInput, got {other}"),
    }
}

#[test]
fn resolve_yields_first_encounter_order_and_skips_unreferenced() {
    let mut store = FrameStore::new(PixelFormat::Straight);
    for id in ["a", "b", "c", "orphan"] {
        store
            .insert_frame(Frame::new(id, "", 1, 1, vec![0; 4]))
            .unwrap();
    }
    store.push_group(AnimationGroup::new("g1", vec!["c".into(), "a".into()]));
    store.push_group(AnimationGroup::new("g2", vec!["a".into(), "b".into(), "c".into()]));

    let ids: Vec<&str> = store
        .resolve()
        .unwrap()
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);

    let atlas = build_atlas(&store, &PackConfig::default()).unwrap();
    assert_eq!(atlas.entries().len(), 3);
    assert!(atlas.entry("orphan").is_none());
}

#[test]
fn add_animation_sets_back_reference() {
    let mut store = FrameStore::new(PixelFormat::Premultiplied);
    store
        .add_animation("idle", vec![Frame::new("idle/0", "", 1, 1, vec![0; 4])])
        .unwrap();
    assert_eq!(store.frame("idle/0").unwrap().animation, "idle");
    assert_eq!(store.groups()[0].frames, vec![FrameId::from("idle/0")]);
    let atlas = build_atlas(&store, &PackConfig::default()).unwrap();
    assert_eq!(atlas.meta().format, "RGBA8888_PREMULTIPLIED");
}
