#![allow(dead_code)]

use blockjoin::{Block, GeoOps, GeometryError, GeometryOps, Submission};
use geo::{coord, MultiPolygon, Rect};

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
    Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
}

pub fn rect_polygon(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![rect(x0, y0, x1, y1).to_polygon()])
}

pub fn geo_block(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Block<MultiPolygon<f64>> {
    Block::new(id, rect_polygon(x0, y0, x1, y1), &GeoOps).unwrap()
}

pub fn geo_submission(id: i64, x0: f64, y0: f64, x1: f64, y1: f64) -> Submission<MultiPolygon<f64>> {
    Submission::new(id, format!("submission {id}"), rect_polygon(x0, y0, x1, y1))
}

/// Axis-aligned rectangles with exact arithmetic, for threshold boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectOps;

impl GeometryOps for RectOps {
    type Geometry = Rect<f64>;

    fn bounding_box(&self, geom: &Rect<f64>) -> Option<Rect<f64>> { Some(*geom) }

    fn overlaps(&self, a: &Rect<f64>, b: &Rect<f64>) -> Result<bool, GeometryError> {
        Ok(a.min().x <= b.max().x && b.min().x <= a.max().x
            && a.min().y <= b.max().y && b.min().y <= a.max().y)
    }

    fn intersection(&self, a: &Rect<f64>, b: &Rect<f64>) -> Result<Option<Rect<f64>>, GeometryError> {
        let min = coord! { x: a.min().x.max(b.min().x), y: a.min().y.max(b.min().y) };
        let max = coord! { x: a.max().x.min(b.max().x), y: a.max().y.min(b.max().y) };
        if min.x >= max.x || min.y >= max.y { return Ok(None) }
        Ok(Some(Rect::new(min, max)))
    }

    fn area(&self, geom: &Rect<f64>) -> f64 { geom.width() * geom.height() }
}
