#![doc = "Area-filtered spatial join of polygon submissions against blocks"]
mod config;
mod error;
mod feature;
mod geom;
mod index;
mod join;

#[doc(inline)]
pub use config::{JoinConfig, DEFAULT_FANOUT, DEFAULT_MIN_AREA_RATIO};

#[doc(inline)]
pub use error::{GeometryError, JoinError, Result};

#[doc(inline)]
pub use feature::{Block, Intersection, Submission};

#[doc(inline)]
pub use geom::{GeoOps, GeometryOps};

#[doc(inline)]
pub use index::{BlockIndex, FanOut};

#[doc(inline)]
pub use join::{join, JoinOutput, JoinStats, ResultTable, SpatialJoin};
