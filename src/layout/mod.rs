pub mod engine;
pub mod tables;
pub mod view;

pub use engine::{display_radius, layout_2d, layout_seeded, Layout2D, Layout2DNode, LayoutLevel, Viewport};
pub use tables::PlanetType;
pub use view::{zone_bounds, View2d, ZoneBounds};
