use crate::error::{AtlasError, Result};
use crate::model::{AnimationGroup, Frame, FrameId, PixelFormat};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Owns authored frames and the animations that reference them.
///
/// Frames are validated on insertion, so everything reachable from a store is
/// safe to pack.
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    format: PixelFormat,
    frames: Vec<Frame>,
    index: HashMap<FrameId, usize>,
    groups: Vec<AnimationGroup>,
}

impl FrameStore {
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Stores a frame. Fails with `InvalidFrameData` when the pixel buffer does
    /// not match `width * height * 4`, and with `InvalidInput` on a reused id.
    pub fn insert_frame(&mut self, frame: Frame) -> Result<()> {
        frame.validate()?;
        if self.index.contains_key(&frame.id) {
            return Err(AtlasError::InvalidInput(format!(
                "duplicate frame id '{}'",
                frame.id
            )));
        }
        self.index.insert(frame.id.clone(), self.frames.len());
        self.frames.push(frame);
        Ok(())
    }

    pub fn push_group(&mut self, group: AnimationGroup) {
        self.groups.push(group);
    }

    /// Inserts `frames` and appends an animation referencing them in order.
    pub fn add_animation(&mut self, name: impl Into<String>, frames: Vec<Frame>) -> Result<()> {
        let name = name.into();
        let mut ids = Vec::with_capacity(frames.len());
        for mut frame in frames {
            frame.animation = name.clone();
            ids.push(frame.id.clone());
            self.insert_frame(frame)?;
        }
        self.groups.push(AnimationGroup::new(name, ids));
        Ok(())
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.index.get(id).map(|&i| &self.frames[i])
    }

    /// All stored frames in insertion order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn groups(&self) -> &[AnimationGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Distinct frames referenced by the animations, in first-encounter order
    /// (group order, then playback order).
    pub fn resolve(&self) -> Result<Vec<&Frame>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for group in &self.groups {
            for id in &group.frames {
                let frame = self.frame(id.as_str()).ok_or_else(|| {
                    AtlasError::InvalidInput(format!(
                        "animation '{}' references unknown frame '{}'",
                        group.name, id
                    ))
                })?;
                if seen.insert(id.as_str()) {
                    out.push(frame);
                }
            }
        }
        let unreferenced = self.frames.len() - out.len();
        if unreferenced > 0 {
            debug!(unreferenced, "frames not referenced by any animation are skipped");
        }
        Ok(out)
    }
}
