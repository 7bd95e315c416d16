//! Duplicate frame detection.
//!
//! Frames are bucketed by a 128-bit content fingerprint and merged only after
//! an exact byte comparison, so a hash collision can never alias two
//! different images. The first frame of each duplicate group (in input order)
//! is canonical; every other member maps straight to it.

use crate::model::{Frame, FrameId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};
use xxhash_rust::xxh3::Xxh3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const XXH3_SEED: u64 = 0x6a09e667f3bcc909;

/// Content fingerprint over dimensions and pixel bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl FrameFingerprint {
    pub fn of(frame: &Frame) -> Self {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        h.update(&frame.width.to_le_bytes());
        h.update(&frame.height.to_le_bytes());
        h.update(&frame.pixels);
        let v = h.digest128();
        Self {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

/// Alias -> canonical index produced by [`group_duplicates`].
#[derive(Debug, Clone, Default)]
pub struct DuplicateMap {
    order: Vec<FrameId>,
    canonicals: Vec<FrameId>,
    aliases: HashMap<FrameId, FrameId>,
    degenerate: HashSet<FrameId>,
}

impl DuplicateMap {
    /// Every frame is its own canonical.
    pub fn identity(frames: &[&Frame]) -> Self {
        let mut map = Self::default();
        for f in frames {
            map.order.push(f.id.clone());
            map.canonicals.push(f.id.clone());
            if f.is_degenerate() {
                map.degenerate.insert(f.id.clone());
            }
        }
        map
    }

    /// Canonical id for `id`; the id itself when it is canonical or unknown.
    pub fn canonical_of<'a>(&'a self, id: &'a FrameId) -> &'a FrameId {
        self.aliases.get(id).unwrap_or(id)
    }

    pub fn is_canonical(&self, id: &FrameId) -> bool {
        !self.aliases.contains_key(id)
    }

    pub fn is_degenerate(&self, id: &FrameId) -> bool {
        self.degenerate.contains(id)
    }

    /// Canonical frames in input order.
    pub fn canonicals(&self) -> &[FrameId] {
        &self.canonicals
    }

    /// (alias, canonical) pairs in input order.
    pub fn aliases(&self) -> impl Iterator<Item = (&FrameId, &FrameId)> {
        self.order
            .iter()
            .filter_map(|id| self.aliases.get(id).map(|c| (id, c)))
    }

    /// Number of frames the map was built from.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn duplicate_count(&self) -> usize {
        self.aliases.len()
    }
}

/// Groups pixel-identical frames. Pure; deterministic for a given input order.
pub fn group_duplicates(frames: &[&Frame]) -> DuplicateMap {
    group_duplicates_with(frames, false)
}

/// Same as [`group_duplicates`]; fingerprints on the rayon pool when
/// `parallel` is set and the crate feature "parallel" is enabled.
#[instrument(skip_all, fields(frames = frames.len()))]
pub fn group_duplicates_with(frames: &[&Frame], parallel: bool) -> DuplicateMap {
    let prints = fingerprints(frames, parallel);
    group_by_prints(frames, &prints)
}

/// `prints[i]` is the bucket key of `frames[i]`. Frames sharing a key are
/// merged only when their bytes are equal.
fn group_by_prints(frames: &[&Frame], prints: &[FrameFingerprint]) -> DuplicateMap {
    let mut map = DuplicateMap::default();
    // Per fingerprint, indices of the canonical frames seen so far.
    let mut buckets: HashMap<FrameFingerprint, Vec<usize>> = HashMap::new();
    for (i, frame) in frames.iter().enumerate() {
        map.order.push(frame.id.clone());
        if frame.is_degenerate() {
            map.degenerate.insert(frame.id.clone());
            map.canonicals.push(frame.id.clone());
            continue;
        }
        let bucket = buckets.entry(prints[i]).or_default();
        let found = bucket.iter().copied().find(|&c| same_pixels(frames[c], frame));
        match found {
            Some(c) => {
                map.aliases.insert(frame.id.clone(), frames[c].id.clone());
            }
            None => {
                if !bucket.is_empty() {
                    warn!(frame = %frame.id, "fingerprint collision with different pixel content");
                }
                bucket.push(i);
                map.canonicals.push(frame.id.clone());
            }
        }
    }
    debug!(
        canonical = map.canonicals.len(),
        duplicates = map.aliases.len(),
        "duplicate detection done"
    );
    map
}

fn same_pixels(a: &Frame, b: &Frame) -> bool {
    a.width == b.width && a.height == b.height && a.pixels == b.pixels
}

#[allow(unused_variables)]
fn fingerprints(frames: &[&Frame], parallel: bool) -> Vec<FrameFingerprint> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return frames.par_iter().map(|f| FrameFingerprint::of(f)).collect();
        }
    }
    frames.iter().map(|f| FrameFingerprint::of(f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: &str, fill: u8) -> Frame {
        Frame::new(id, "anim", 2, 2, vec![fill; 16])
    }

    #[test]
    fn colliding_fingerprints_keep_distinct_pixels_apart() {
        let a = frame("a", 1);
        let b = frame("b", 2);
        let c = frame("c", 1);
        let frames = vec![&a, &b, &c];
        // Every frame lands in the same bucket.
        let prints = vec![FrameFingerprint { hi: 7, lo: 7 }; frames.len()];

        let map = group_by_prints(&frames, &prints);

        let canon: Vec<&str> = map.canonicals().iter().map(|id| id.as_str()).collect();
        assert_eq!(canon, vec!["a", "b"]);
        assert_eq!(map.duplicate_count(), 1);
        assert_eq!(map.canonical_of(&c.id).as_str(), "a");
        assert!(map.is_canonical(&b.id));
    }
}
