use ahash::AHashMap;

use crate::feature::Intersection;

/// Accepted intersections grouped by block id.
///
/// Results under one key keep their insertion order; keys have no order.
/// A key exists only once it holds at least one result.
#[derive(Debug, Clone)]
pub struct ResultTable<G> {
    groups: AHashMap<String, Vec<Intersection<G>>>,
    total: usize,
}

impl<G> Default for ResultTable<G> {
    fn default() -> Self {
        Self { groups: AHashMap::new(), total: 0 }
    }
}

impl<G> ResultTable<G> {
    pub fn new() -> Self { Self::default() }

    /// Append `result` under `block_id`.
    pub fn record(&mut self, block_id: &str, result: Intersection<G>) {
        match self.groups.get_mut(block_id) {
            Some(results) => results.push(result),
            None => { self.groups.insert(block_id.to_owned(), vec![result]); }
        }
        self.total += 1;
    }

    /// Get the total number of recorded results across all blocks.
    #[inline] pub fn total(&self) -> usize { self.total }

    /// Get the number of blocks with at least one result.
    #[inline] pub fn len(&self) -> usize { self.groups.len() }

    /// Check if nothing has been recorded.
    #[inline] pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    /// Get the results recorded under `block_id`.
    #[inline]
    pub fn get(&self, block_id: &str) -> Option<&[Intersection<G>]> {
        self.groups.get(block_id).map(Vec::as_slice)
    }

    /// Iterate over the block ids that have results.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Iterate over `(block id, results)` groups.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Intersection<G>])> {
        self.groups.iter().map(|(id, results)| (id.as_str(), results.as_slice()))
    }

    /// Append every group of `other` after this table's results for the same key.
    pub fn merge(&mut self, other: ResultTable<G>) {
        for (id, mut results) in other.groups {
            self.groups.entry(id).or_default().append(&mut results);
        }
        self.total += other.total;
    }

    /// Consume the table, returning the grouped results.
    pub fn into_map(self) -> AHashMap<String, Vec<Intersection<G>>> { self.groups }
}
