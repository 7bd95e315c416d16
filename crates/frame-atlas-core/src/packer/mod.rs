use crate::model::Rect;

pub mod guillotine;

/// Candidate placement returned by [`Packer::best_fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    /// Index of the free region the rect goes into.
    pub region: usize,
    /// Occupied area including padding (post-rotation).
    pub footprint: Rect,
    pub rotated: bool,
    /// Lower is better. Ties keep the earlier candidate.
    pub score: u64,
}

/// A packer places rectangles into a single sheet.
///
/// Implementations must ensure no overlaps and keep padding between placements.
/// Search and commit are separate so a caller can compare candidates across
/// several sheets before claiming space.
pub trait Packer {
    fn best_fit(&self, w: u32, h: u32) -> Option<Fit>;
    /// Claims the space of `fit` and returns the tight (padding-free) rect.
    fn commit(&mut self, fit: &Fit) -> Rect;
    /// Tight rects placed so far, in placement order.
    fn used(&self) -> &[Rect];

    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.best_fit(w, h).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<(Rect, bool)> {
        let fit = self.best_fit(w, h)?;
        let rect = self.commit(&fit);
        Some((rect, fit.rotated))
    }
}
