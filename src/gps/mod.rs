//! GPS text tokens and free-form location resolution.

pub mod locate;
pub mod token;

pub use locate::{parse_free_point, resolve_location, ParseError, RoutePoint};
pub use token::{GpsColor, GpsFormatError, GpsToken};
