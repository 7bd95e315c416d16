use crate::assemble::assemble;
use crate::config::PackConfig;
use crate::dedup::{DuplicateMap, group_duplicates_with};
use crate::error::{AtlasError, Result};
use crate::layout::{PackInput, pack_rects_with_cancel};
use crate::model::{Atlas, Meta};
use crate::store::FrameStore;
use std::sync::atomic::AtomicBool;
use tracing::{info, instrument};

/// Builds an atlas from every animation in `store`.
///
/// Notes:
/// - Runs dedup, packing and compositing in order; any error aborts the whole
///   build, there is no partially built atlas.
/// - Output is deterministic for a given store and config.
pub fn build_atlas(store: &FrameStore, cfg: &PackConfig) -> Result<Atlas> {
    build(store, cfg, None)
}

/// Same as [`build_atlas`], checking `cancel` between rect placements.
pub fn build_atlas_with_cancel(
    store: &FrameStore,
    cfg: &PackConfig,
    cancel: &AtomicBool,
) -> Result<Atlas> {
    build(store, cfg, Some(cancel))
}

#[instrument(skip_all, fields(animations = store.groups().len()))]
fn build(store: &FrameStore, cfg: &PackConfig, cancel: Option<&AtomicBool>) -> Result<Atlas> {
    // Validate configuration first
    cfg.validate()?;

    let frames = store.resolve()?;

    let dups = if cfg.detect_duplicates {
        group_duplicates_with(&frames, cfg.parallel)
    } else {
        DuplicateMap::identity(&frames)
    };

    let inputs: Vec<PackInput> = dups
        .canonicals()
        .iter()
        .map(|id| {
            let f = store
                .frame(id.as_str())
                .ok_or_else(|| AtlasError::Consistency(format!("canonical '{}' not in store", id)))?;
            Ok(PackInput::new(id.clone(), f.width, f.height))
        })
        .collect::<Result<_>>()?;

    let layout = pack_rects_with_cancel(&inputs, cfg, cancel)?;
    let (sheets, lookup) = assemble(&frames, &dups, &layout, cfg.parallel)?;

    for group in store.groups() {
        for id in &group.frames {
            if lookup.get(id.as_str()).is_none() {
                return Err(AtlasError::Consistency(format!(
                    "frame '{}' of '{}' has no lookup entry",
                    id, group.name
                )));
            }
        }
    }

    let atlas = Atlas {
        groups: store.groups().to_vec(),
        sheets,
        lookup,
        config: cfg.clone(),
        meta: Meta::from_config(cfg, store.format()),
    };
    info!(
        frames = frames.len(),
        unique = dups.canonicals().len(),
        sheets = atlas.sheet_count(),
        "atlas built"
    );
    Ok(atlas)
}
