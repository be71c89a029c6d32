pub mod animation;
pub mod cancel;
pub mod easing;
pub mod event_bus;
pub mod frame;

pub use animation::*;
pub use cancel::*;
pub use event_bus::*;
pub use frame::*;
