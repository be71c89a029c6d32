pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod gestures;
pub mod intent;
pub mod picking;
pub mod session;

pub use config::*;
pub use controller::*;
pub use error::*;
pub use frame::*;
pub use gestures::*;
pub use intent::*;
pub use picking::*;
pub use session::*;
