use crate::error::{AtlasError, Result};
use crate::model::{AnimationGroup, Atlas, FrameId, Meta, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Metadata formats the exporters can write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Full descriptor; readable back with [`AtlasDescriptor::from_json`].
    Json,
    /// TexturePacker-like frames map keyed by frame id, plus animations.
    JsonHash,
    /// Apple XML plist.
    Plist,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json | ExportFormat::JsonHash => "json",
            ExportFormat::Plist => "plist",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "json-array" => Ok(Self::Json),
            "json-hash" => Ok(Self::JsonHash),
            "plist" => Ok(Self::Plist),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetRecord {
    pub index: usize,
    pub image: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub id: FrameId,
    pub sheet: usize,
    pub frame: Rect,
    pub rotated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<FrameId>,
}

/// Stable, order-preserving view of an [`Atlas`] for runtime loaders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasDescriptor {
    pub meta: Meta,
    pub sheets: Vec<SheetRecord>,
    pub frames: Vec<FrameRecord>,
    pub animations: Vec<AnimationGroup>,
}

impl AtlasDescriptor {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| AtlasError::Decode(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AtlasError::Encode(e.to_string()))
    }

    pub fn frame(&self, id: &str) -> Option<&FrameRecord> {
        self.frames.iter().find(|f| f.id.as_str() == id)
    }

    pub fn animation(&self, name: &str) -> Option<&AnimationGroup> {
        self.animations.iter().find(|a| a.name == name)
    }
}

/// `name.png` for a single sheet, `name_<i>.png` otherwise.
pub fn sheet_file_names(base: &str, count: usize) -> Vec<String> {
    if count == 1 {
        vec![format!("{}.png", base)]
    } else {
        (0..count).map(|i| format!("{}_{}.png", base, i)).collect()
    }
}

fn sheet_name(names: &[String], index: usize) -> String {
    names
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("sheet_{}.png", index))
}

impl Atlas {
    /// Builds the descriptor; `sheet_names[i]` names the image of sheet `i`.
    pub fn descriptor(&self, sheet_names: &[String]) -> AtlasDescriptor {
        let sheets = self
            .sheets()
            .iter()
            .map(|s| SheetRecord {
                index: s.index,
                image: sheet_name(sheet_names, s.index),
                width: s.width(),
                height: s.height(),
            })
            .collect();
        let frames = self
            .entries()
            .iter()
            .map(|e| FrameRecord {
                id: e.frame.clone(),
                sheet: e.sheet,
                frame: e.rect,
                rotated: e.rotated,
                alias_of: e.alias_of.clone(),
            })
            .collect();
        AtlasDescriptor {
            meta: self.meta().clone(),
            sheets,
            frames,
            animations: self.groups().to_vec(),
        }
    }

    /// Writes every sheet into `dir` as `sheet_names[i]` (format from the
    /// extension) and returns the written paths in sheet order.
    pub fn save_sheets(&self, dir: &Path, sheet_names: &[String]) -> Result<Vec<PathBuf>> {
        if sheet_names.len() != self.sheet_count() {
            return Err(AtlasError::InvalidInput(format!(
                "{} sheet names for {} sheets",
                sheet_names.len(),
                self.sheet_count()
            )));
        }
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(sheet_names.len());
        for (sheet, name) in self.sheets().iter().zip(sheet_names) {
            let path = dir.join(name);
            sheet.image.save(&path)?;
            debug!(?path, sheet = sheet.index, "wrote sheet");
            written.push(path);
        }
        Ok(written)
    }
}

/// Flatten frames keyed by id, with sheet index/size hints.
/// Shape: `{ frames: { id: { frame, rotated, sourceSize, sheet, sheetSize, aliasOf? } }, animations: [...], meta }`.
pub fn to_json_hash(atlas: &Atlas, sheet_names: &[String]) -> Value {
    let mut frames = serde_json::Map::new();
    for e in atlas.entries() {
        let (sw, sh) = atlas
            .sheet(e.sheet)
            .map(|s| (s.width(), s.height()))
            .unwrap_or((0, 0));
        let r = e.rect;
        let source_size = if e.rotated {
            json!({"w": r.h, "h": r.w})
        } else {
            json!({"w": r.w, "h": r.h})
        };
        let mut v = json!({
            "frame": {"x": r.x, "y": r.y, "w": r.w, "h": r.h},
            "rotated": e.rotated,
            "sourceSize": source_size,
            "sheet": e.sheet,
            "sheetSize": {"w": sw, "h": sh},
        });
        if let (Some(alias), Some(obj)) = (&e.alias_of, v.as_object_mut()) {
            obj.insert("aliasOf".into(), json!(alias));
        }
        frames.insert(e.frame.to_string(), v);
    }
    let animations: Vec<Value> = atlas
        .groups()
        .iter()
        .map(|g| json!({"name": g.name, "frames": g.frames}))
        .collect();
    let images: Vec<String> = (0..atlas.sheet_count())
        .map(|i| sheet_name(sheet_names, i))
        .collect();
    json!({
        "frames": frames,
        "animations": animations,
        "meta": &atlas.meta,
        "images": images,
    })
}

/// Serialize `atlas` in `format`. `sheet_names[i]` names the image of sheet `i`.
pub fn export(atlas: &Atlas, format: ExportFormat, sheet_names: &[String]) -> Result<String> {
    match format {
        ExportFormat::Json => atlas.descriptor(sheet_names).to_json_string(),
        ExportFormat::JsonHash => serde_json::to_string_pretty(&to_json_hash(atlas, sheet_names))
            .map_err(|e| AtlasError::Encode(e.to_string())),
        ExportFormat::Plist => Ok(crate::export_plist::to_plist(atlas, sheet_names)),
    }
}
