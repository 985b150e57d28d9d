use geo::Rect;
use rstar::{RTreeObject, AABB};

/// Convert a rectangle to an R-tree envelope.
#[inline]
pub(crate) fn envelope(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(rect.min().into(), rect.max().into())
}

/// Check that every corner of `rect` is a finite number.
#[inline]
pub(crate) fn is_finite(rect: &Rect<f64>) -> bool {
    rect.min().x.is_finite() && rect.min().y.is_finite()
        && rect.max().x.is_finite() && rect.max().y.is_finite()
}

/// An R-tree entry: a block's bounding rectangle, tagged with the
/// block's position in the index's block list.
#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    block: usize,
    bbox: Rect<f64>,
}

impl IndexEntry {
    pub(crate) fn new(block: usize, bbox: Rect<f64>) -> Self {
        Self { block, bbox }
    }

    /// Position of the block in the index's block list.
    #[inline] pub(crate) fn block(&self) -> usize { self.block }
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope(&self.bbox)
    }
}
