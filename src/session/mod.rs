pub mod state;
pub mod tile;

pub use state::{Session, Stage};
pub use tile::TileStatus;
