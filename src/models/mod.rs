pub mod payload;
pub mod raster;

pub use payload::{Payload, Region};
pub use raster::{Raster, Rotation};
