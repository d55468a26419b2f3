use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Upload Error: {0}")]
    Upload(#[from] UploadError),
    #[error("Generation Error: {0}")]
    Generation(#[from] GenerationError),
    #[error("Album Error: {0}")]
    Album(#[from] AlbumError),
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GUI Error: {0}")]
    Gui(#[from] eframe::Error),
}

// Errors raised while accepting an uploaded portrait.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Unsupported image format, expected PNG, JPEG or WebP")]
    UnsupportedFormat,
    #[error("The uploaded file is not a readable image: {0}")]
    Decode(#[from] image::ImageError),
}

// Errors from a single call to the image generation API.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No API key configured, set GEMINI_API_KEY or api.api_key")]
    MissingApiKey,
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("The API returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("The request was blocked: {0}")]
    Blocked(String),
    #[error("The model responded without an image{}", text_suffix(.0))]
    NoImage(Option<String>),
    #[error("The returned image data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("The returned image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum AlbumError {
    #[error("Album needs every image to be finished, still missing: {}", join_labels(.missing))]
    Incomplete { missing: Vec<String> },
    #[error("Album has no images to lay out")]
    Empty,
    #[error("Failed to decode image for {label}: {source}")]
    Decode {
        label: String,
        source: image::ImageError,
    },
    #[error("Failed to encode album image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to parse album page: {0}")]
    Svg(#[from] usvg::Error),
    #[error("Failed to allocate a {width}x{height} album page")]
    Pixmap { width: u32, height: u32 },
    #[error("Album task stopped: {0}")]
    Task(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Upload a photo before choosing a style")]
    NoSourceImage,
    #[error("Generation is already running")]
    AlreadyGenerating,
}

fn text_suffix(text: &Option<String>) -> String {
    match text {
        Some(text) => format!(": {text}"),
        None => String::new(),
    }
}

fn join_labels(labels: &[String]) -> String {
    labels.join(", ")
}
