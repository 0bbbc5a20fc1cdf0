//! Type definitions

pub mod emissions;
pub mod geo;
pub mod map;
pub mod messages;
pub mod route;
pub mod vehicle;

pub use emissions::*;
pub use geo::*;
pub use map::*;
pub use messages::*;
pub use route::*;
pub use vehicle::*;
