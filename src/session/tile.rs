use crate::common::GeneratedImage;

#[derive(Debug, Clone)]
pub enum TileStatus {
    Pending,
    Done(GeneratedImage),
    Error(String),
}

impl TileStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TileStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            TileStatus::Done(image) => Some(image),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TileStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}
