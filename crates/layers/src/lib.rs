pub mod arcs;
pub mod cache;
pub mod layer;
pub mod outlines;
pub mod points;
pub mod symbology;

pub use layer::*;
