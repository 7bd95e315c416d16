use super::{Fit, Packer};
use crate::config::{PackConfig, SplitRule};
use crate::model::Rect;

/// Best-area-fit guillotine packer for one sheet.
///
/// Free space is a flat list of disjoint rectangles. Each placement consumes
/// one region and splits the rest into a right strip and a bottom strip.
pub struct GuillotinePacker {
    padding: u32,
    allow_rotation: bool,
    split: SplitRule,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl GuillotinePacker {
    pub fn new(config: &PackConfig) -> Self {
        Self::with_bounds(
            config.max_width,
            config.max_height,
            config.padding,
            config.allow_rotation,
            config.split,
        )
    }

    pub fn with_bounds(
        width: u32,
        height: u32,
        padding: u32,
        allow_rotation: bool,
        split: SplitRule,
    ) -> Self {
        // Footprints carry their padding on the right and bottom; the extra strip
        // lets a rect touch the far sheet edge.
        let w = width.saturating_add(padding);
        let h = height.saturating_add(padding);
        Self {
            padding,
            allow_rotation,
            split,
            free: vec![Rect::new(0, 0, w, h)],
            used: Vec::new(),
        }
    }

    pub fn free_regions(&self) -> &[Rect] {
        &self.free
    }

    fn score(fr: &Rect, w: u32, h: u32) -> u64 {
        fr.area() - (w as u64 * h as u64)
    }

    fn choose(&self, w: u32, h: u32) -> Option<Fit> {
        let mut best: Option<Fit> = None;
        for (i, fr) in self.free.iter().enumerate() {
            if fr.w >= w && fr.h >= h {
                let s = Self::score(fr, w, h);
                if best.is_none_or(|b| s < b.score) {
                    best = Some(Fit {
                        region: i,
                        footprint: Rect::new(fr.x, fr.y, w, h),
                        rotated: false,
                        score: s,
                    });
                }
            }
            if self.allow_rotation && w != h && fr.w >= h && fr.h >= w {
                let s = Self::score(fr, h, w);
                if best.is_none_or(|b| s < b.score) {
                    best = Some(Fit {
                        region: i,
                        footprint: Rect::new(fr.x, fr.y, h, w),
                        rotated: true,
                        score: s,
                    });
                }
            }
        }
        best
    }

    /// Splits free region `fr` around `placed` (which sits at its top-left corner)
    /// into the bottom strip and the right strip. Zero-area pieces are dropped.
    pub fn split(&self, fr: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
        let w_right = (fr.x + fr.w).saturating_sub(placed.x + placed.w);
        let h_bottom = (fr.y + fr.h).saturating_sub(placed.y + placed.h);

        // true: the bottom strip spans the full region width.
        let split_horizontal = match self.split {
            SplitRule::ShorterLeftoverAxis => h_bottom < w_right,
            SplitRule::LongerLeftoverAxis => h_bottom > w_right,
            SplitRule::MinimizeArea => {
                (w_right as u64 * fr.h as u64) <= (fr.w as u64 * h_bottom as u64)
            }
            SplitRule::MaximizeArea => {
                (w_right as u64 * fr.h as u64) >= (fr.w as u64 * h_bottom as u64)
            }
            SplitRule::ShorterAxis => fr.h < fr.w,
            SplitRule::LongerAxis => fr.h > fr.w,
        };

        let mut bottom = Rect::new(fr.x, placed.y + placed.h, 0, h_bottom);
        let mut right = Rect::new(placed.x + placed.w, fr.y, w_right, 0);
        if split_horizontal {
            bottom.w = fr.w;
            right.h = placed.h;
        } else {
            bottom.w = placed.w;
            right.h = fr.h;
        }
        let r1 = (!bottom.is_empty()).then_some(bottom);
        let r2 = (!right.is_empty()).then_some(right);
        (r1, r2)
    }

    fn merge_free_list(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.free.len() {
                for j in i + 1..self.free.len() {
                    let a = self.free[i];
                    let b = self.free[j];
                    // horizontal merge (same y, height, contiguous in x)
                    if a.y == b.y && a.h == b.h {
                        if a.x + a.w == b.x {
                            self.free[i] = Rect::new(a.x, a.y, a.w + b.w, a.h);
                            self.free.remove(j);
                            merged = true;
                            break 'outer;
                        } else if b.x + b.w == a.x {
                            self.free[i] = Rect::new(b.x, a.y, a.w + b.w, a.h);
                            self.free.remove(j);
                            merged = true;
                            break 'outer;
                        }
                    }
                    // vertical merge (same x, width, contiguous in y)
                    if a.x == b.x && a.w == b.w {
                        if a.y + a.h == b.y {
                            self.free[i] = Rect::new(a.x, a.y, a.w, a.h + b.h);
                            self.free.remove(j);
                            merged = true;
                            break 'outer;
                        } else if b.y + b.h == a.y {
                            self.free[i] = Rect::new(a.x, b.y, a.w, a.h + b.h);
                            self.free.remove(j);
                            merged = true;
                            break 'outer;
                        }
                    }
                }
            }
        }
    }
}

impl Packer for GuillotinePacker {
    fn best_fit(&self, w: u32, h: u32) -> Option<Fit> {
        self.choose(w.saturating_add(self.padding), h.saturating_add(self.padding))
    }

    fn commit(&mut self, fit: &Fit) -> Rect {
        // `remove` rather than `swap_remove`: region order is part of the tie-break.
        let fr = self.free.remove(fit.region);
        let (a, b) = self.split(&fr, &fit.footprint);
        self.free.extend(a);
        self.free.extend(b);
        self.merge_free_list();
        let placed = Rect::new(
            fit.footprint.x,
            fit.footprint.y,
            fit.footprint.w - self.padding,
            fit.footprint.h - self.padding,
        );
        self.used.push(placed);
        placed
    }

    fn used(&self) -> &[Rect] {
        &self.used
    }
}
