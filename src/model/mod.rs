// MODEL: Game state and data
pub mod bitmap;
pub mod player;

pub use bitmap::{Bitmap, ImageResource, LoadState};
pub use player::{Entity, Player};
