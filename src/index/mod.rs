mod block_index;
mod entry;
mod params;

pub use block_index::BlockIndex;
pub(crate) use entry::is_finite;
pub use params::FanOut;
