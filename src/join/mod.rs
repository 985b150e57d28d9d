mod engine;
mod stats;
mod table;

pub use engine::{join, JoinOutput, SpatialJoin};
pub use stats::JoinStats;
pub use table::ResultTable;
