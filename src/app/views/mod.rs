pub mod footer;
pub mod mode_picker;
pub mod polaroid_card;
pub mod upload_view;

use crate::catalog::TransformMode;

/// User intents collected while drawing a frame, handled after the UI pass.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    PickFile,
    ChooseMode(TransformMode),
    Regenerate(String),
    SaveImage(String),
    DownloadAlbum,
    BackToModes,
    StartOver,
}

pub trait View {
    fn draw(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>);
}
