use crate::config::PackConfig;
use crate::error::{AtlasError, Result};
use crate::model::{FrameId, PackedRect, Rect};
use crate::packer::{Fit, Packer, guillotine::GuillotinePacker};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};

/// Size-only input to the packing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackInput {
    pub id: FrameId,
    pub w: u32,
    pub h: u32,
}

impl PackInput {
    pub fn new(id: impl Into<FrameId>, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            w,
            h,
        }
    }
}

/// Final pixel size of one sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetSize {
    pub width: u32,
    pub height: u32,
}

/// Result of [`pack_rects`]: one placement per input (input order) plus sheet sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub placements: Vec<PackedRect>,
    pub sheets: Vec<SheetSize>,
}

impl Layout {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

/// Packs rect sizes into sheets without touching pixel data.
///
/// Notes:
/// - Placement order is height desc, width desc, id asc, so output is reproducible.
/// - Zero-area inputs are not placed; they get an empty rect on sheet 0.
/// - With no placeable inputs the layout is a single 1x1 sheet.
pub fn pack_rects(inputs: &[PackInput], cfg: &PackConfig) -> Result<Layout> {
    pack_rects_with_cancel(inputs, cfg, None)
}

/// Same as [`pack_rects`], checking `cancel` between placements.
#[instrument(skip_all, fields(rects = inputs.len()))]
pub fn pack_rects_with_cancel(
    inputs: &[PackInput],
    cfg: &PackConfig,
    cancel: Option<&AtomicBool>,
) -> Result<Layout> {
    cfg.validate()?;

    let mut order: Vec<usize> = (0..inputs.len())
        .filter(|&i| inputs[i].w > 0 && inputs[i].h > 0)
        .collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&inputs[a], &inputs[b]);
        rb.h.cmp(&ra.h)
            .then_with(|| rb.w.cmp(&ra.w))
            .then_with(|| ra.id.cmp(&rb.id))
    });

    let mut placements: Vec<Option<PackedRect>> = inputs
        .iter()
        .map(|r| {
            (r.w == 0 || r.h == 0).then_some(PackedRect {
                sheet: 0,
                rect: Rect::default(),
                rotated: false,
            })
        })
        .collect();

    let mut sheets: Vec<Box<dyn Packer>> = Vec::new();
    for idx in order {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(AtlasError::Cancelled);
        }
        let input = &inputs[idx];
        let mut found = best_fit_across(&sheets, input.w, input.h);
        if found.is_none() && (sheets.is_empty() || cfg.allow_multiple_sheets) {
            sheets.push(Box::new(GuillotinePacker::new(cfg)));
            let sheet = sheets.len() - 1;
            debug!(sheet, trigger = %input.id, "opened sheet");
            found = sheets[sheet].best_fit(input.w, input.h).map(|fit| (sheet, fit));
        }
        let (sheet, fit) = found.ok_or_else(|| AtlasError::PackingOverflow {
            frame: input.id.to_string(),
            width: input.w,
            height: input.h,
            max_width: cfg.max_width,
            max_height: cfg.max_height,
        })?;
        let rect = sheets[sheet].commit(&fit);
        placements[idx] = Some(PackedRect {
            sheet,
            rect,
            rotated: fit.rotated,
        });
    }

    let mut sizes: Vec<SheetSize> = sheets.iter().map(|s| sheet_size(s.used(), cfg)).collect();
    if sizes.is_empty() {
        sizes.push(SheetSize {
            width: 1,
            height: 1,
        });
    }

    let placements = placements
        .into_iter()
        .zip(inputs)
        .map(|(p, input)| {
            p.ok_or_else(|| AtlasError::Consistency(format!("'{}' was never placed", input.id)))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(sheets = sizes.len(), "layout done");
    Ok(Layout {
        placements,
        sheets: sizes,
    })
}

/// Lowest score over all open sheets; ties keep the lower sheet index.
fn best_fit_across(sheets: &[Box<dyn Packer>], w: u32, h: u32) -> Option<(usize, Fit)> {
    let mut best: Option<(usize, Fit)> = None;
    for (i, sheet) in sheets.iter().enumerate() {
        if let Some(fit) = sheet.best_fit(w, h) {
            if best.is_none_or(|(_, b)| fit.score < b.score) {
                best = Some((i, fit));
            }
        }
    }
    best
}

/// Tight bounding box of the placements, at least 1x1.
fn sheet_size(used: &[Rect], cfg: &PackConfig) -> SheetSize {
    let mut width = 1u32;
    let mut height = 1u32;
    for r in used {
        width = width.max(r.x + r.w);
        height = height.max(r.y + r.h);
    }
    if cfg.power_of_two {
        width = width.next_power_of_two();
        height = height.next_power_of_two();
    }
    SheetSize { width, height }
}
