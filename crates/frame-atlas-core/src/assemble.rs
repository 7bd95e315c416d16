use crate::compositing::blit_frame;
use crate::dedup::DuplicateMap;
use crate::error::{AtlasError, Result};
use crate::layout::Layout;
use crate::model::{AtlasSheet, Frame, FrameId, FrameLookupEntry, LookupTable, PackedRect};
use image::RgbaImage;
use std::collections::HashMap;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Paints canonical frames into their sheets and builds the lookup table.
///
/// `layout.placements` must be in the order of `dups.canonicals()`. Duplicates
/// get entries pointing at their canonical's placement and are not painted.
#[instrument(skip_all, fields(frames = frames.len(), sheets = layout.sheets.len()))]
pub fn assemble(
    frames: &[&Frame],
    dups: &DuplicateMap,
    layout: &Layout,
    parallel: bool,
) -> Result<(Vec<AtlasSheet>, LookupTable)> {
    let canonicals = dups.canonicals();
    if canonicals.len() != layout.placements.len() {
        return Err(AtlasError::Consistency(format!(
            "{} canonical frames but {} placements",
            canonicals.len(),
            layout.placements.len()
        )));
    }
    let placed: HashMap<&FrameId, PackedRect> = canonicals
        .iter()
        .zip(layout.placements.iter().copied())
        .collect();
    let by_id: HashMap<&FrameId, &Frame> = frames.iter().map(|f| (&f.id, *f)).collect();

    let mut jobs: Vec<Vec<(&Frame, PackedRect)>> = vec![Vec::new(); layout.sheets.len()];
    for id in canonicals {
        let frame = by_id
            .get(id)
            .ok_or_else(|| AtlasError::Consistency(format!("unknown canonical frame '{}'", id)))?;
        if frame.is_degenerate() {
            continue;
        }
        let p = placed[id];
        let sheet_jobs = jobs.get_mut(p.sheet).ok_or_else(|| {
            AtlasError::Consistency(format!("'{}' placed on missing sheet {}", id, p.sheet))
        })?;
        sheet_jobs.push((*frame, p));
    }

    let sheets = composite_sheets(layout, jobs, parallel)?;

    let mut lookup = LookupTable::new();
    for frame in frames {
        let canonical = dups.canonical_of(&frame.id);
        let p = placed.get(canonical).ok_or_else(|| {
            AtlasError::Consistency(format!("no placement for '{}'", canonical))
        })?;
        lookup.insert(FrameLookupEntry {
            frame: frame.id.clone(),
            sheet: p.sheet,
            rect: p.rect,
            rotated: p.rotated,
            alias_of: (canonical != &frame.id).then(|| canonical.clone()),
        })?;
    }
    debug!(entries = lookup.len(), "lookup table built");
    Ok((sheets, lookup))
}

fn paint_sheet(index: usize, width: u32, height: u32, jobs: &[(&Frame, PackedRect)]) -> Result<AtlasSheet> {
    let mut image = RgbaImage::new(width, height);
    for (frame, p) in jobs {
        blit_frame(frame, &mut image, &p.rect, p.rotated)?;
    }
    Ok(AtlasSheet { index, image })
}

#[allow(unused_variables)]
fn composite_sheets(
    layout: &Layout,
    jobs: Vec<Vec<(&Frame, PackedRect)>>,
    parallel: bool,
) -> Result<Vec<AtlasSheet>> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return layout
                .sheets
                .par_iter()
                .zip(jobs.par_iter())
                .enumerate()
                .map(|(i, (size, jobs))| paint_sheet(i, size.width, size.height, jobs))
                .collect();
        }
    }
    layout
        .sheets
        .iter()
        .zip(jobs.iter())
        .enumerate()
        .map(|(i, (size, jobs))| paint_sheet(i, size.width, size.height, jobs))
        .collect()
}
