//! quizdrop-core: placement reconciliation, form model, and answering sessions.
//!
//! The heart of this crate is [`placement::PlacementStore`], a pure
//! reconciler that applies drag gesture-end events to a set of containers
//! without ever losing or duplicating an item. The bucket and cloze question
//! types are thin instantiations of it.

pub mod bucket;
pub mod choice;
pub mod cloze;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod placement;
pub mod response;
pub mod session;
pub mod traits;
