pub mod countries;
pub mod flow;
pub mod selection;
pub mod snapshot;

pub use countries::*;
pub use flow::*;
pub use selection::*;
pub use snapshot::*;
