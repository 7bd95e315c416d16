use crate::config::PackConfig;
use crate::error::{AtlasError, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        !(self.x >= other.x + other.w
            || other.x >= self.x + self.w
            || self.y >= other.y + other.h
            || other.y >= self.y + self.h)
    }
}

/// Stable frame identifier, unique within a [`FrameStore`](crate::store::FrameStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FrameId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FrameId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FrameId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How color channels relate to alpha. All frames of one atlas share one format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Straight,
    Premultiplied,
}

impl PixelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Straight => "RGBA8888",
            PixelFormat::Premultiplied => "RGBA8888_PREMULTIPLIED",
        }
    }
}

/// One authored animation frame: RGBA8 pixels, row-major, `width * height * 4` bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    pub id: FrameId,
    /// Name of the animation this frame was authored in (grouping only).
    pub animation: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(
        id: impl Into<FrameId>,
        animation: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            animation: animation.into(),
            width,
            height,
            pixels,
        }
    }

    pub fn from_rgba(id: impl Into<FrameId>, animation: impl Into<String>, img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        Self::new(id, animation, w, h, img.as_raw().clone())
    }

    /// Byte length implied by the frame dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fails with `InvalidFrameData` when the buffer does not match the reported size.
    pub fn validate(&self) -> Result<()> {
        let expected = self.expected_len();
        if self.pixels.len() != expected {
            return Err(AtlasError::InvalidFrameData {
                frame: self.id.to_string(),
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// Ordered frame references of one animation. Order is playback order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnimationGroup {
    pub name: String,
    pub frames: Vec<FrameId>,
}

impl AnimationGroup {
    pub fn new(name: impl Into<String>, frames: Vec<FrameId>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }
}

/// Placement of one rect on a sheet. `rect` excludes padding and holds
/// post-rotation dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackedRect {
    pub sheet: usize,
    pub rect: Rect,
    pub rotated: bool,
}

/// One output image.
#[derive(Debug, Clone)]
pub struct AtlasSheet {
    pub index: usize,
    pub image: RgbaImage,
}

impl AtlasSheet {
    pub fn width(&self) -> u32 {
        self.image.width()
    }
    pub fn height(&self) -> u32 {
        self.image.height()
    }
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }
    /// Raw RGBA8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Where a frame lives in the atlas. Duplicates carry `alias_of` pointing
/// directly at their canonical frame and share its sheet and rect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameLookupEntry {
    pub frame: FrameId,
    pub sheet: usize,
    pub rect: Rect,
    pub rotated: bool,
    pub alias_of: Option<FrameId>,
}

impl FrameLookupEntry {
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }
}

/// Frame id -> placement, kept in first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: Vec<FrameLookupEntry>,
    index: HashMap<FrameId, usize>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; a second entry for the same id is a consistency error.
    pub fn insert(&mut self, entry: FrameLookupEntry) -> Result<()> {
        if self.index.contains_key(&entry.frame) {
            return Err(AtlasError::Consistency(format!(
                "frame '{}' has more than one lookup entry",
                entry.frame
            )));
        }
        self.index.insert(entry.frame.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&FrameLookupEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[FrameLookupEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Atlas-level metadata written by every exporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    /// Schema version of the descriptor; bumped on incompatible changes.
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub format: String,
    pub max_dim: (u32, u32),
    pub padding: u32,
    pub allow_rotation: bool,
    pub allow_multiple_sheets: bool,
    pub power_of_two: bool,
}

impl Meta {
    pub fn from_config(cfg: &PackConfig, format: PixelFormat) -> Self {
        Self {
            schema_version: "1".into(),
            app: "frame-atlas".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            format: format.as_str().into(),
            max_dim: (cfg.max_width, cfg.max_height),
            padding: cfg.padding,
            allow_rotation: cfg.allow_rotation,
            allow_multiple_sheets: cfg.allow_multiple_sheets,
            power_of_two: cfg.power_of_two,
        }
    }
}

/// The finished, read-only result of [`build_atlas`](crate::pipeline::build_atlas).
#[derive(Debug, Clone)]
pub struct Atlas {
    pub(crate) groups: Vec<AnimationGroup>,
    pub(crate) sheets: Vec<AtlasSheet>,
    pub(crate) lookup: LookupTable,
    pub(crate) config: PackConfig,
    pub(crate) meta: Meta,
}

impl Atlas {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
    pub fn sheet(&self, index: usize) -> Option<&AtlasSheet> {
        self.sheets.get(index)
    }
    pub fn sheets(&self) -> &[AtlasSheet] {
        &self.sheets
    }
    pub fn entry(&self, id: &str) -> Option<&FrameLookupEntry> {
        self.lookup.get(id)
    }
    pub fn entries(&self) -> &[FrameLookupEntry] {
        self.lookup.entries()
    }
    pub fn groups(&self) -> &[AnimationGroup] {
        &self.groups
    }
    pub fn config(&self) -> &PackConfig {
        &self.config
    }
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Computes packing statistics for this atlas.
    pub fn stats(&self) -> AtlasStats {
        let num_sheets = self.sheets.len();
        let mut total_sheet_area = 0u64;
        let mut max_sheet_width = 0u32;
        let mut max_sheet_height = 0u32;
        for sheet in &self.sheets {
            total_sheet_area += sheet.bounds().area();
            max_sheet_width = max_sheet_width.max(sheet.width());
            max_sheet_height = max_sheet_height.max(sheet.height());
        }

        let mut num_unique = 0;
        let mut num_duplicates = 0;
        let mut num_rotated = 0;
        let mut used_area = 0u64;
        for e in self.lookup.entries() {
            if e.is_alias() {
                num_duplicates += 1;
                continue;
            }
            num_unique += 1;
            used_area += e.rect.area();
            if e.rotated {
                num_rotated += 1;
            }
        }

        let occupancy = if total_sheet_area > 0 {
            used_area as f64 / total_sheet_area as f64
        } else {
            0.0
        };

        AtlasStats {
            num_sheets,
            num_frames: self.lookup.len(),
            num_unique,
            num_duplicates,
            num_rotated,
            total_sheet_area,
            used_area,
            occupancy,
            max_sheet_width,
            max_sheet_height,
        }
    }
}

/// Statistics about packing efficiency and deduplication.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtlasStats {
    pub num_sheets: usize,
    /// Lookup entries, i.e. distinct frame ids referenced by animations.
    pub num_frames: usize,
    /// Frames whose pixels were actually packed (degenerate frames included).
    pub num_unique: usize,
    /// Frames aliased to a canonical frame.
    pub num_duplicates: usize,
    pub num_rotated: usize,
    pub total_sheet_area: u64,
    pub used_area: u64,
    /// used_area / total_sheet_area (0.0 to 1.0).
    pub occupancy: f64,
    pub max_sheet_width: u32,
    pub max_sheet_height: u32,
}

impl AtlasStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Sheets: {}, Frames: {} ({} unique, {} duplicates), Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px², Rotated: {}",
            self.num_sheets,
            self.num_frames,
            self.num_unique,
            self.num_duplicates,
            self.occupancy * 100.0,
            self.total_sheet_area,
            self.used_area,
            self.num_rotated,
        )
    }

    pub fn wasted_area(&self) -> u64 {
        self.total_sheet_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_sheet_area > 0 {
            (self.wasted_area() as f64 / self.total_sheet_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
