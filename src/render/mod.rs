//! Raster rendering: text field drawing and certificate compositing.

pub mod compositor;
pub mod text;

pub use compositor::{composite, encode_png, render_certificate};
pub use text::{draw_field, measure_width, shrink_floor, shrink_to_fit};
