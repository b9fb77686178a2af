//! Value types for light control parameters.

mod brightness;
mod color;
mod kelvin;
mod power;
mod scene;

pub use brightness::Brightness;
pub use color::{Color, ColorRGBWW, hex_to_rgb, rgb_to_rgbcw};
pub use kelvin::Kelvin;
pub use power::PowerMode;
pub use scene::SceneMode;
