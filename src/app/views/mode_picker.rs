use egui::{Align, Layout, RichText, Vec2};

use crate::app::views::{UiAction, View};
use crate::catalog::TransformMode;
use crate::common::SourceImage;

const PREVIEW_SIZE: f32 = 320.0;

/// Shows the uploaded photo and one button per transform set.
pub struct ModePickerView<'a> {
    source: &'a SourceImage,
}

impl<'a> ModePickerView<'a> {
    pub fn new(source: &'a SourceImage) -> Self {
        Self { source }
    }
}

impl View for ModePickerView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.with_layout(Layout::top_down(Align::Center), |ui| {
            ui.add_space(24.0);
            ui.add(
                egui::Image::from_bytes(self.source.uri(), self.source.bytes().clone())
                    .fit_to_exact_size(Vec2::splat(PREVIEW_SIZE)),
            );
            ui.add_space(16.0);
            ui.heading("Pick a set of variations");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                for mode in TransformMode::ALL {
                    let labels = mode.labels().join(", ");
                    if ui
                        .button(RichText::new(mode.title()).size(20.0))
                        .on_hover_text(labels)
                        .clicked()
                    {
                        actions.push(UiAction::ChooseMode(mode));
                    }
                }
            });
            ui.add_space(8.0);
            if ui.small_button("Use a different photo").clicked() {
                actions.push(UiAction::StartOver);
            }
        });
    }
}
