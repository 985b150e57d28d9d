use rstar::{RStarInsertionStrategy, RTreeParams};

/// R-tree node parameters with a node capacity (fan-out) of `N`.
///
/// Bulk loading packs up to `N` children per node. `N` must be at least 4;
/// smaller values fail to compile when the tree is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanOut<const N: usize>;

impl<const N: usize> RTreeParams for FanOut<N> {
    const MIN_SIZE: usize = if N / 3 > 1 { N / 3 } else { 1 };
    const MAX_SIZE: usize = {
        assert!(N >= 4, "R-tree fan-out must be at least 4");
        N
    };
    const REINSERTION_COUNT: usize = (N - Self::MIN_SIZE) / 2;
    type DefaultInsertionStrategy = RStarInsertionStrategy;
}
