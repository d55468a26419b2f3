pub mod album;
pub mod app;
pub mod catalog;
pub mod common;
pub mod config;
pub mod error;
pub mod generation;
pub mod session;

pub use error::{AlbumError, AppError, GenerationError, SessionError, UploadError};

pub use album::AlbumComposer;
pub use catalog::{Transform, TransformMode};
pub use config::Settings;
pub use session::{Session, Stage, TileStatus};
