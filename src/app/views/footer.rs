use egui::RichText;

use crate::app::views::{UiAction, View};
use crate::error::AppError;

pub struct Footer<'a> {
    pub generator: &'a str,
    pub workers: usize,
    pub pending: usize,
    pub status: &'a str,
    pub errors: &'a [AppError],
}

impl View for Footer<'_> {
    fn draw(&mut self, ui: &mut egui::Ui, _actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("Model: {}", self.generator)).weak());
            ui.separator();
            ui.label(RichText::new(format!("{} workers", self.workers)).weak());
            if self.pending > 0 {
                ui.separator();
                ui.spinner();
                ui.label(format!("{} in progress", self.pending));
            }
            if !self.status.is_empty() {
                ui.separator();
                ui.label(self.status);
            }
        });

        if !self.errors.is_empty() {
            egui::CollapsingHeader::new(format!("Error Log ({})", self.errors.len()))
                .id_salt("error_log")
                .show(ui, |ui| {
                    egui::ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                        for error in self.errors.iter().rev() {
                            ui.label(format!("[ERROR] {}", error));
                        }
                    });
                });
        }
    }
}
