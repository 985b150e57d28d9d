use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::config::{JoinConfig, DEFAULT_FANOUT};
use crate::error::{JoinError, Result};
use crate::feature::{Block, Intersection, Submission};
use crate::geom::GeometryOps;
use crate::index::{is_finite, BlockIndex};
use crate::join::{JoinStats, ResultTable};

/// The grouped results of a join run and its counters.
#[derive(Debug, Clone)]
pub struct JoinOutput<G> {
    pub table: ResultTable<G>,
    pub stats: JoinStats,
}

impl<G> Default for JoinOutput<G> {
    fn default() -> Self {
        Self { table: ResultTable::default(), stats: JoinStats::default() }
    }
}

impl<G> JoinOutput<G> {
    /// Get the total number of accepted intersections.
    #[inline] pub fn total(&self) -> usize { self.table.total() }

    /// Append `other` after this output.
    pub fn merge(&mut self, other: JoinOutput<G>) {
        self.table.merge(other.table);
        self.stats.merge(&other.stats);
    }
}

/// Raised inside a parallel fold when the cancel flag is observed.
struct Interrupted;

/// Joins submissions against an indexed block set.
///
/// For every submission the index yields candidate blocks by bounding box.
/// Each candidate must then pass the exact overlap test, produce a
/// non-empty overlay, and cover at least `min_area_ratio` of the block.
/// Geometry failures skip the pair and are counted in [`JoinStats`].
pub struct SpatialJoin<'a, O: GeometryOps, const FANOUT: usize = { DEFAULT_FANOUT }> {
    index: &'a BlockIndex<O::Geometry, FANOUT>,
    ops: &'a O,
    config: JoinConfig,
}

impl<'a, O: GeometryOps, const FANOUT: usize> SpatialJoin<'a, O, FANOUT> {
    /// Create an engine over `index`, validating `config`.
    pub fn new(index: &'a BlockIndex<O::Geometry, FANOUT>, ops: &'a O, config: JoinConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { index, ops, config })
    }

    #[inline] pub fn config(&self) -> &JoinConfig { &self.config }

    #[inline] pub fn index(&self) -> &BlockIndex<O::Geometry, FANOUT> { self.index }

    /// Join a single submission, recording accepted results into `table`.
    pub fn join_submission(
        &self,
        submission: &Submission<O::Geometry>,
        table: &mut ResultTable<O::Geometry>,
        stats: &mut JoinStats,
    ) {
        stats.submissions += 1;

        let Some(bbox) = self.ops.bounding_box(&submission.geometry).filter(is_finite) else {
            stats.empty_submissions += 1;
            tracing::debug!(submission = submission.id, "submission has no finite bounding box; skipped");
            return;
        };

        for block in self.index.query(&bbox) {
            stats.candidates += 1;

            match self.ops.overlaps(&submission.geometry, block.geometry()) {
                Ok(true) => {}
                Ok(false) => {
                    stats.disjoint += 1;
                    continue;
                }
                Err(e) => {
                    stats.overlap_errors += 1;
                    tracing::warn!(
                        submission = submission.id,
                        block = block.id(),
                        error = %e,
                        "overlap test failed; skipping pair"
                    );
                    continue;
                }
            }

            let geometry = match self.ops.intersection(&submission.geometry, block.geometry()) {
                Ok(Some(geometry)) => geometry,
                Ok(None) => {
                    stats.empty_overlays += 1;
                    tracing::trace!(submission = submission.id, block = block.id(), "overlay is empty");
                    continue;
                }
                Err(e) => {
                    stats.overlay_errors += 1;
                    tracing::debug!(
                        submission = submission.id,
                        block = block.id(),
                        error = %e,
                        "overlay construction failed; skipping pair"
                    );
                    continue;
                }
            };

            let area = self.ops.area(&geometry);
            if !(area > 0.0) {
                stats.empty_overlays += 1;
                tracing::trace!(submission = submission.id, block = block.id(), "overlay has no area");
                continue;
            }

            let ratio = area / block.area();
            if !(ratio >= self.config.min_area_ratio) {
                stats.negligible += 1;
                tracing::trace!(submission = submission.id, block = block.id(), ratio, "overlap below threshold");
                continue;
            }

            table.record(block.id(), Intersection::new(geometry, submission, area, ratio));
            stats.accepted += 1;
        }
    }

    /// Log the run summary and hand the output back.
    fn finish(&self, output: JoinOutput<O::Geometry>) -> JoinOutput<O::Geometry> {
        let stats = &output.stats;
        tracing::info!(
            submissions = stats.submissions,
            candidates = stats.candidates,
            accepted = stats.accepted,
            blocks_matched = output.table.len(),
            overlap_errors = stats.overlap_errors,
            overlay_errors = stats.overlay_errors,
            "spatial join complete"
        );
        output
    }
}

impl<'a, O, const FANOUT: usize> SpatialJoin<'a, O, FANOUT>
where
    O: GeometryOps + Sync,
    O::Geometry: Send + Sync,
{
    /// Join every submission against the index.
    ///
    /// With `parallel` set, submissions are split across the rayon pool and
    /// the per-worker tables are merged in submission order.
    pub fn run(&self, submissions: &[Submission<O::Geometry>]) -> JoinOutput<O::Geometry> {
        let _span = tracing::info_span!(
            "spatial_join",
            blocks = self.index.len(),
            submissions = submissions.len(),
            parallel = self.config.parallel
        ).entered();

        let output = if self.config.parallel {
            submissions.par_iter()
                .fold(JoinOutput::default, |mut output, submission| {
                    self.join_submission(submission, &mut output.table, &mut output.stats);
                    output
                })
                .reduce(JoinOutput::default, |mut a, b| { a.merge(b); a })
        } else {
            let mut output = JoinOutput::default();
            for submission in submissions {
                self.join_submission(submission, &mut output.table, &mut output.stats);
            }
            output
        };

        self.finish(output)
    }

    /// Like [`run`](Self::run), but stops when `cancel` is set.
    ///
    /// The flag is checked between submissions, never inside a geometry
    /// operation. A cancelled run discards its partial results.
    pub fn run_with_cancel(
        &self,
        submissions: &[Submission<O::Geometry>],
        cancel: &AtomicBool,
    ) -> Result<JoinOutput<O::Geometry>> {
        let _span = tracing::info_span!(
            "spatial_join",
            blocks = self.index.len(),
            submissions = submissions.len(),
            parallel = self.config.parallel
        ).entered();

        let output = if self.config.parallel {
            let processed = AtomicUsize::new(0);
            submissions.par_iter()
                .try_fold(JoinOutput::default, |mut output, submission| {
                    if cancel.load(Ordering::Relaxed) { return Err(Interrupted) }
                    self.join_submission(submission, &mut output.table, &mut output.stats);
                    processed.fetch_add(1, Ordering::Relaxed);
                    Ok(output)
                })
                .try_reduce(JoinOutput::default, |mut a, b| { a.merge(b); Ok(a) })
                .map_err(|Interrupted| JoinError::Cancelled { processed: processed.load(Ordering::Relaxed) })?
        } else {
            let mut output = JoinOutput::default();
            for (processed, submission) in submissions.iter().enumerate() {
                if cancel.load(Ordering::Relaxed) {
                    return Err(JoinError::Cancelled { processed });
                }
                self.join_submission(submission, &mut output.table, &mut output.stats);
            }
            output
        };

        Ok(self.finish(output))
    }
}

/// Build an index over `blocks` with the default fan-out and join
/// `submissions` against it. For another fan-out, build the index with
/// [`BlockIndex::build_with_fanout`] and use [`SpatialJoin`] directly.
pub fn join<O>(
    blocks: Vec<Block<O::Geometry>>,
    submissions: &[Submission<O::Geometry>],
    ops: &O,
    config: JoinConfig,
) -> Result<JoinOutput<O::Geometry>>
where
    O: GeometryOps + Sync,
    O::Geometry: Send + Sync,
{
    let index = BlockIndex::build(blocks, ops);
    Ok(SpatialJoin::new(&index, ops, config)?.run(submissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use geo::{coord, Rect};

    /// Exact rectangle arithmetic with optional failure injection.
    #[derive(Default)]
    struct RectOps {
        fail_overlap: Option<Rect<f64>>,
        fail_overlay: Option<Rect<f64>>,
        degenerate_overlay: Option<Rect<f64>>,
    }

    impl GeometryOps for RectOps {
        type Geometry = Rect<f64>;

        fn bounding_box(&self, geom: &Rect<f64>) -> Option<Rect<f64>> { Some(*geom) }

        fn overlaps(&self, a: &Rect<f64>, b: &Rect<f64>) -> std::result::Result<bool, GeometryError> {
            if self.fail_overlap == Some(*a) { return Err(GeometryError::Invalid("self-intersection".into())) }
            Ok(a.min().x <= b.max().x && b.min().x <= a.max().x
                && a.min().y <= b.max().y && b.min().y <= a.max().y)
        }

        fn intersection(&self, a: &Rect<f64>, b: &Rect<f64>)
            -> std::result::Result<Option<Rect<f64>>, GeometryError>
        {
            if self.fail_overlay == Some(*a) { return Err(GeometryError::Overlay("singular".into())) }
            if self.degenerate_overlay == Some(*a) {
                // A backend returning a collapsed geometry instead of `None`.
                return Ok(Some(Rect::new(a.min(), a.min())))
            }
            let min = coord! { x: a.min().x.max(b.min().x), y: a.min().y.max(b.min().y) };
            let max = coord! { x: a.max().x.min(b.max().x), y: a.max().y.min(b.max().y) };
            if min.x >= max.x || min.y >= max.y { return Ok(None) }
            Ok(Some(Rect::new(min, max)))
        }

        fn area(&self, geom: &Rect<f64>) -> f64 { geom.width() * geom.height() }
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    fn block(id: &str, geom: Rect<f64>, ops: &RectOps) -> Block<Rect<f64>> {
        Block::new(id, geom, ops).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let ops = RectOps::default();
        let index = BlockIndex::build(vec![], &ops);
        let config = JoinConfig::default().with_min_area_ratio(2.0);
        assert!(matches!(SpatialJoin::new(&index, &ops, config), Err(JoinError::Config(_))));
        assert!(matches!(join(vec![], &[], &ops, config), Err(JoinError::Config(_))));
    }

    #[test]
    fn overlap_failure_skips_only_that_pair() {
        let bad = rect(1.0, 1.0, 3.0, 3.0);
        let ops = RectOps { fail_overlap: Some(bad), ..Default::default() };
        let index = BlockIndex::build(vec![block("b", rect(0.0, 0.0, 10.0, 10.0), &ops)], &ops);
        let engine = SpatialJoin::new(&index, &ops, JoinConfig::default()).unwrap();

        let output = engine.run(&[
            Submission::new(1, "bad", bad),
            Submission::new(2, "good", rect(4.0, 4.0, 6.0, 6.0)),
        ]);

        assert_eq!(output.total(), 1);
        assert_eq!(output.stats.overlap_errors, 1);
        assert_eq!(output.table.get("b").unwrap()[0].submission_id(), 2);
    }

    #[test]
    fn overlay_failure_is_not_fatal() {
        let bad = rect(1.0, 1.0, 3.0, 3.0);
        let ops = RectOps { fail_overlay: Some(bad), ..Default::default() };
        let index = BlockIndex::build(vec![
            block("left", rect(0.0, 0.0, 2.0, 10.0), &ops),
            block("right", rect(2.0, 0.0, 4.0, 10.0), &ops),
        ], &ops);
        let engine = SpatialJoin::new(&index, &ops, JoinConfig::default()).unwrap();

        let output = engine.run(&[Submission::new(1, "bad", bad)]);
        assert!(output.table.is_empty());
        assert_eq!(output.stats.candidates, 2);
        assert_eq!(output.stats.overlay_errors, 2);
    }

    #[test]
    fn collapsed_overlay_is_rejected_even_at_zero_threshold() {
        let degenerate = rect(1.0, 1.0, 3.0, 3.0);
        let ops = RectOps { degenerate_overlay: Some(degenerate), ..Default::default() };
        let index = BlockIndex::build(vec![block("b", rect(0.0, 0.0, 10.0, 10.0), &ops)], &ops);
        let config = JoinConfig::default().with_min_area_ratio(0.0);
        let engine = SpatialJoin::new(&index, &ops, config).unwrap();

        let output = engine.run(&[Submission::new(1, "collapsed", degenerate)]);
        assert!(output.table.is_empty());
        assert_eq!(output.stats.empty_overlays, 1);
    }

    #[test]
    fn touching_pair_yields_empty_overlay() {
        let ops = RectOps::default();
        let index = BlockIndex::build(vec![block("b", rect(0.0, 0.0, 1.0, 1.0), &ops)], &ops);
        let engine = SpatialJoin::new(&index, &ops, JoinConfig::default()).unwrap();

        let output = engine.run(&[Submission::new(1, "edge", rect(1.0, 0.0, 2.0, 1.0))]);
        assert!(output.table.is_empty());
        assert_eq!(output.stats.candidates, 1);
        assert_eq!(output.stats.empty_overlays, 1);
    }

    #[test]
    fn stats_account_for_every_candidate() {
        let bad = rect(8.0, 8.0, 9.0, 9.0);
        let ops = RectOps { fail_overlay: Some(bad), ..Default::default() };
        let blocks = (0..10)
            .map(|i| block(&format!("b{i}"), rect(i as f64, 0.0, i as f64 + 1.0, 10.0), &ops))
            .collect();
        let index = BlockIndex::build(blocks, &ops);
        let engine = SpatialJoin::new(&index, &ops, JoinConfig::default()).unwrap();

        let output = engine.run(&[
            Submission::new(1, "wide", rect(0.5, 0.0, 5.5, 10.0)),
            Submission::new(2, "sliver", rect(2.0, 0.0, 2.05, 1.0)),
            Submission::new(3, "bad", bad),
        ]);

        let stats = output.stats;
        assert_eq!(stats.submissions, 3);
        assert_eq!(stats.candidates, stats.accepted + stats.rejected());
        assert_eq!(stats.accepted, output.total());
        assert!(stats.negligible > 0);
        assert!(stats.overlay_errors > 0);
    }

    #[test]
    fn cancel_before_first_submission() {
        let ops = RectOps::default();
        let index = BlockIndex::build(vec![block("b", rect(0.0, 0.0, 10.0, 10.0), &ops)], &ops);
        let submissions = [Submission::new(1, "a", rect(1.0, 1.0, 2.0, 2.0))];
        let cancel = AtomicBool::new(true);

        for parallel in [false, true] {
            let config = JoinConfig::default().with_parallel(parallel);
            let engine = SpatialJoin::new(&index, &ops, config).unwrap();
            let result = engine.run_with_cancel(&submissions, &cancel);
            assert!(matches!(result, Err(JoinError::Cancelled { processed: 0 })));
        }
    }

    #[test]
    fn uncancelled_run_matches_plain_run() {
        let ops = RectOps::default();
        let index = BlockIndex::build(vec![
            block("a", rect(0.0, 0.0, 5.0, 5.0), &ops),
            block("b", rect(5.0, 0.0, 10.0, 5.0), &ops),
        ], &ops);
        let submissions = (0..20)
            .map(|i| Submission::new(i, format!("s{i}"), rect(i as f64 * 0.4, 1.0, i as f64 * 0.4 + 1.0, 2.0)))
            .collect::<Vec<_>>();
        let cancel = AtomicBool::new(false);

        for parallel in [false, true] {
            let config = JoinConfig::default().with_parallel(parallel);
            let engine = SpatialJoin::new(&index, &ops, config).unwrap();
            let plain = engine.run(&submissions);
            let cancellable = engine.run_with_cancel(&submissions, &cancel).unwrap();
            assert_eq!(plain.stats, cancellable.stats);
            assert_eq!(plain.total(), cancellable.total());
        }
    }
}
