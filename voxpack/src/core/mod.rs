mod color;
mod direction;

pub use color::{ColorPalette, PALETTE_SIZE, Rgba};
pub use direction::{AxisMap, DIRECTION_COUNT, Direction};
