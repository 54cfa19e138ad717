pub mod geometry;
pub mod renderer;

pub use geometry::PolarGeometry;
pub use renderer::{DisplaySurface, SonarRenderer};
