use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{Area, BooleanOps, BoundingRect, CoordsIter, Intersects, MultiPolygon, Rect};

use crate::error::GeometryError;

/// The geometry primitives the join depends on.
///
/// Implementations must be pure over immutable values. Failures are
/// reported as [`GeometryError`] and never abort the join.
pub trait GeometryOps {
    /// The polygon representation this backend operates on.
    type Geometry;

    /// Axis-aligned bounds of `geom`, or `None` if it is empty or has
    /// non-finite coordinates. Geometries without bounds never reach
    /// `overlaps` or `intersection` during a join.
    fn bounding_box(&self, geom: &Self::Geometry) -> Option<Rect<f64>>;

    /// Exact intersection test (not a bounding-box test).
    fn overlaps(&self, a: &Self::Geometry, b: &Self::Geometry) -> Result<bool, GeometryError>;

    /// Construct the overlap region of `a` and `b`.
    /// Returns `Ok(None)` when the overlay is empty.
    fn intersection(&self, a: &Self::Geometry, b: &Self::Geometry)
        -> Result<Option<Self::Geometry>, GeometryError>;

    /// Non-negative planar area of `geom`.
    fn area(&self, geom: &Self::Geometry) -> f64;
}

/// [`GeometryOps`] backed by the `geo` crate, over `MultiPolygon<f64>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoOps;

impl GeoOps {
    fn is_finite(geom: &MultiPolygon<f64>) -> bool {
        geom.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
    }
}

/// Best-effort text of a caught panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic in overlay kernel".to_string()
    }
}

impl GeometryOps for GeoOps {
    type Geometry = MultiPolygon<f64>;

    fn bounding_box(&self, geom: &MultiPolygon<f64>) -> Option<Rect<f64>> {
        if !Self::is_finite(geom) { return None }
        geom.bounding_rect()
    }

    #[inline]
    fn overlaps(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<bool, GeometryError> {
        Ok(a.intersects(b))
    }

    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>)
        -> Result<Option<MultiPolygon<f64>>, GeometryError>
    {
        // The overlay kernel panics on some singular inputs; contain it to this pair.
        let overlay = catch_unwind(AssertUnwindSafe(|| a.intersection(b)))
            .map_err(|payload| GeometryError::Overlay(panic_message(payload.as_ref())))?;

        if overlay.0.is_empty() {
            return Ok(None)
        }
        Ok(Some(overlay))
    }

    #[inline]
    fn area(&self, geom: &MultiPolygon<f64>) -> f64 {
        geom.unsigned_area()
    }
}
