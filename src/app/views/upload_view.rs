use egui::{Align, Layout, RichText};

use crate::app::views::{UiAction, View};

pub struct UploadView;

impl View for UploadView {
    fn draw(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.with_layout(Layout::top_down(Align::Center), |ui| {
            ui.add_space(ui.available_height() * 0.25);
            ui.heading(RichText::new("Upload a portrait").size(32.0));
            ui.add_space(8.0);
            ui.label("PNG, JPEG or WebP. A clear, front-facing photo works best.");
            ui.add_space(16.0);
            if ui.button(RichText::new("Choose photo…").size(20.0)).clicked() {
                actions.push(UiAction::PickFile);
            }
            ui.add_space(8.0);
            ui.weak("or drop an image file onto this window");
        });
    }
}
