pub mod surface;
pub mod raster;
pub mod canvas2d;

pub use surface::{Color, PixelBuffer, Rect, Surface};
pub use raster::PixelCanvas;
pub use canvas2d::WebCanvas;
