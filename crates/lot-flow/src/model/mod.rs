//! Pure data structures for lots, implementing the
//! [`Document`](store_actor::Document) trait over in `crate::lot_actor`.

pub mod lot;
pub mod stage;
pub mod status;

pub use lot::*;
pub use stage::*;
pub use status::*;
