//! Core library for packing animation frames into texture atlases.
//!
//! - Frame store: animations referencing validated RGBA8 frames by id
//! - Dedup: pixel-identical frames are packed once (xxh3 fingerprint + exact compare)
//! - Packing: deterministic best-area-fit guillotine, optionally over several sheets
//! - Assembly: sheets as `RgbaImage` plus a frame id -> placement lookup table
//! - Export: JSON descriptor (round-trippable), JSON hash and plist
//!
//! Quick example:
//! ```ignore
//! use frame_atlas_core::prelude::*;
//! # fn main() -> frame_atlas_core::Result<()> {
//! let mut store = FrameStore::new(PixelFormat::Straight);
//! store.add_animation("walk", vec![
//!     Frame::new("walk/0", "walk", 16, 16, vec![0; 16 * 16 * 4]),
//!     Frame::new("walk/1", "walk", 16, 16, vec![255; 16 * 16 * 4]),
//! ])?;
//! let cfg = PackConfig::builder().with_max_dimensions(256, 256).padding(1).build();
//! let atlas = build_atlas(&store, &cfg)?;
//! println!("sheets: {}", atlas.sheet_count());
//! # Ok(()) }
//! ```

pub mod assemble;
pub mod compositing;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod export_plist;
pub mod layout;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod store;

pub use config::*;
pub use error::*;
pub use export::*;
pub use export_plist::*;
pub use layout::*;
pub use model::*;
pub use pipeline::*;
pub use store::*;

/// Convenience prelude for common types and functions.
/// Importing `frame_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackConfig, PackConfigBuilder, SplitRule};
    pub use crate::dedup::{DuplicateMap, FrameFingerprint, group_duplicates};
    pub use crate::export::{AtlasDescriptor, ExportFormat, export, sheet_file_names};
    pub use crate::layout::{Layout, PackInput, pack_rects};
    pub use crate::model::{
        AnimationGroup, Atlas, AtlasSheet, AtlasStats, Frame, FrameId, FrameLookupEntry,
        PackedRect, PixelFormat, Rect,
    };
    pub use crate::pipeline::{build_atlas, build_atlas_with_cancel};
    pub use crate::store::FrameStore;
    pub use crate::{AtlasError, Result};
}
