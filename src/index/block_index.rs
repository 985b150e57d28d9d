use geo::Rect;
use rstar::RTree;

use crate::config::DEFAULT_FANOUT;
use crate::feature::Block;
use crate::geom::GeometryOps;
use crate::index::{entry::{envelope, is_finite, IndexEntry}, FanOut};

/// A read-only R-tree over block bounding boxes.
///
/// The index owns the blocks for the lifetime of a join run. `FANOUT` is
/// the node capacity used by bulk loading.
pub struct BlockIndex<G, const FANOUT: usize = { DEFAULT_FANOUT }> {
    blocks: Vec<Block<G>>,
    rtree: RTree<IndexEntry, FanOut<FANOUT>>,
}

impl<G> BlockIndex<G> {
    /// Bulk load an index with the default fan-out.
    pub fn build<O>(blocks: Vec<Block<G>>, ops: &O) -> Self
    where
        O: GeometryOps<Geometry = G>,
    {
        Self::build_with_fanout(blocks, ops)
    }
}

impl<G, const FANOUT: usize> BlockIndex<G, FANOUT> {
    /// Bulk load an index with fan-out `FANOUT`.
    ///
    /// Blocks without a finite bounding box (empty or malformed geometry) are
    /// kept in the block list but never returned by [`query`](Self::query).
    pub fn build_with_fanout<O>(blocks: Vec<Block<G>>, ops: &O) -> Self
    where
        O: GeometryOps<Geometry = G>,
    {
        let entries = blocks.iter().enumerate()
            .filter_map(|(i, block)| match ops.bounding_box(block.geometry()) {
                Some(bbox) if is_finite(&bbox) => Some(IndexEntry::new(i, bbox)),
                _ => {
                    tracing::warn!(block = block.id(), "block has no finite bounding box; not indexed");
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(blocks = blocks.len(), indexed = entries.len(), fanout = FANOUT, "built block index");

        Self {
            rtree: RTree::bulk_load_with_params(entries),
            blocks,
        }
    }

    /// Get the number of blocks held by the index.
    #[inline] pub fn len(&self) -> usize { self.blocks.len() }

    /// Check if the index holds no blocks.
    #[inline] pub fn is_empty(&self) -> bool { self.blocks.is_empty() }

    /// Get the number of blocks reachable through queries.
    #[inline] pub fn indexed_len(&self) -> usize { self.rtree.size() }

    /// Get the node capacity the tree was loaded with.
    #[inline] pub const fn fanout(&self) -> usize { FANOUT }

    /// Get a reference to the list of blocks.
    #[inline] pub fn blocks(&self) -> &[Block<G>] { &self.blocks }

    /// Get the block at position `idx`.
    #[inline] pub fn get(&self, idx: usize) -> Option<&Block<G>> { self.blocks.get(idx) }

    /// Iterate over the blocks whose bounding boxes intersect `bbox`.
    /// Each block is yielded at most once, in no particular order.
    #[inline]
    pub fn query(&self, bbox: &Rect<f64>) -> impl Iterator<Item = &Block<G>> {
        self.rtree.locate_in_envelope_intersecting(&envelope(bbox))
            .map(|entry| &self.blocks[entry.block()])
    }

    /// Release the blocks held by the index.
    pub fn into_blocks(self) -> Vec<Block<G>> { self.blocks }
}
