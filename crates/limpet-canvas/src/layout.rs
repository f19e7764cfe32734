//! Bounding-box bookkeeping for the self-shifting canvas.
//!
//! The canvas extent always contains the origin. Settling computes the delta that brings the
//! extent's top-left back to exactly `(0, 0)`; coordinates are whole pixels, so translating by
//! that delta is exact.

use limpet_geom::{IntPoint, IntRect, IntVector, int_rect, int_vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Extent {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Extent {
    fn origin() -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: 0,
            max_y: 0,
        }
    }

    fn include_rect(&mut self, r: &IntRect) {
        if r.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(r.min_x());
        self.min_y = self.min_y.min(r.min_y());
        self.max_x = self.max_x.max(r.max_x());
        self.max_y = self.max_y.max(r.max_y());
    }

    fn include_point(&mut self, p: IntPoint) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    fn translate(&mut self, d: IntVector) {
        self.min_x += d.x;
        self.max_x += d.x;
        self.min_y += d.y;
        self.max_y += d.y;
    }

    fn to_rect(self) -> IntRect {
        int_rect(
            self.min_x,
            self.min_y,
            self.max_x - self.min_x,
            self.max_y - self.min_y,
        )
    }
}

/// Tracks the union of all component bounds. Holds no component state of its own.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    extent: Extent,
    dirty: bool,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            extent: Extent::origin(),
            dirty: false,
        }
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grows the tracked extent to include `bounds`. Marks the layout dirty only when the
    /// extent actually grew; the caller runs the layout pass later.
    pub fn component_moved(&mut self, bounds: IntRect) -> bool {
        let before = self.extent;
        self.extent.include_rect(&bounds);
        if self.extent != before {
            self.dirty = true;
        }
        self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Tracked extent, always containing the origin.
    pub fn extent(&self) -> IntRect {
        self.extent.to_rect()
    }

    /// Recomputes the tight extent from `boxes` (plus `target` and the origin) and returns the
    /// delta `(max(-min_x, 0), max(-min_y, 0))` that moves its top-left onto `(0, 0)`.
    ///
    /// The stored extent is already translated by the returned delta; the caller must apply the
    /// same delta to every component it owns.
    pub fn settle(
        &mut self,
        boxes: impl IntoIterator<Item = IntRect>,
        target: Option<IntPoint>,
    ) -> IntVector {
        let mut extent = Extent::origin();
        for b in boxes {
            extent.include_rect(&b);
        }
        if let Some(p) = target {
            extent.include_point(p);
        }
        let delta = int_vector((-extent.min_x).max(0), (-extent.min_y).max(0));
        extent.translate(delta);
        debug_assert_eq!((extent.min_x, extent.min_y), (0, 0));
        self.extent = extent;
        self.dirty = false;
        delta
    }
}
