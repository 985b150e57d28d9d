mod ops;

pub use ops::{GeoOps, GeometryOps};
