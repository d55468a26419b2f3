pub mod portrait;

pub use portrait::{GeneratedImage, SourceImage, ACCEPTED_EXTENSIONS};
