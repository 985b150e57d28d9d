use crate::error::{JoinError, Result};
use crate::geom::GeometryOps;

/// A block polygon with its area computed once at load time.
#[derive(Debug, Clone)]
pub struct Block<G> {
    id: String,
    geometry: G,
    area: f64,
}

impl<G> Block<G> {
    /// Construct a block, computing its area with `ops`.
    pub fn new<O>(id: impl Into<String>, geometry: G, ops: &O) -> Result<Self>
    where
        O: GeometryOps<Geometry = G>,
    {
        let area = ops.area(&geometry);
        Self::with_area(id, geometry, area)
    }

    /// Construct a block from a caller-supplied area.
    /// The area must be finite and strictly positive.
    pub fn with_area(id: impl Into<String>, geometry: G, area: f64) -> Result<Self> {
        let id = id.into();
        if !(area.is_finite() && area > 0.0) {
            return Err(JoinError::DegenerateBlock { id, area });
        }
        Ok(Self { id, geometry, area })
    }

    #[inline] pub fn id(&self) -> &str { &self.id }

    #[inline] pub fn geometry(&self) -> &G { &self.geometry }

    #[inline] pub fn area(&self) -> f64 { self.area }
}

/// A submitted polygon to be joined against the blocks.
#[derive(Debug, Clone)]
pub struct Submission<G> {
    pub id: i64,
    pub label: String,
    pub geometry: G,
}

impl<G> Submission<G> {
    pub fn new(id: i64, label: impl Into<String>, geometry: G) -> Self {
        Self { id, label: label.into(), geometry }
    }
}

/// One accepted overlap between a submission and a block.
///
/// Carries the submission's identifier and label, plus a secondary `tag`
/// that starts at zero and is left for downstream consumers.
#[derive(Debug, Clone)]
pub struct Intersection<G> {
    geometry: G,
    submission_id: i64,
    label: String,
    tag: f64,
    area: f64,
    ratio: f64,
}

impl<G> Intersection<G> {
    pub(crate) fn new<S>(geometry: G, submission: &Submission<S>, area: f64, ratio: f64) -> Self {
        Self {
            geometry,
            submission_id: submission.id,
            label: submission.label.clone(),
            tag: 0.0,
            area,
            ratio,
        }
    }

    /// The overlap region.
    #[inline] pub fn geometry(&self) -> &G { &self.geometry }

    /// Take ownership of the overlap region.
    #[inline] pub fn into_geometry(self) -> G { self.geometry }

    #[inline] pub fn submission_id(&self) -> i64 { self.submission_id }

    #[inline] pub fn label(&self) -> &str { &self.label }

    #[inline] pub fn tag(&self) -> f64 { self.tag }

    /// Area of the overlap region.
    #[inline] pub fn area(&self) -> f64 { self.area }

    /// Overlap area divided by the block's area.
    #[inline] pub fn ratio(&self) -> f64 { self.ratio }
}
