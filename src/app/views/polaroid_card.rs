use egui::{Align, Color32, Layout, Pos2, Rect, RichText, Stroke, Vec2};

use crate::app::views::{UiAction, View};
use crate::session::TileStatus;

pub const PHOTO_SIZE: f32 = 220.0;
pub const CARD_WIDTH: f32 = PHOTO_SIZE + 24.0;
pub const CARD_HEIGHT: f32 = PHOTO_SIZE + 96.0;

/// One tile of the results board.
pub struct PolaroidCard<'a> {
    label: &'a str,
    status: &'a TileStatus,
}

impl<'a> PolaroidCard<'a> {
    pub fn new(label: &'a str, status: &'a TileStatus) -> Self {
        Self { label, status }
    }

    fn draw_photo(&self, ui: &mut egui::Ui) {
        let size = Vec2::splat(PHOTO_SIZE);
        match self.status {
            TileStatus::Done(image) => {
                ui.add(
                    egui::Image::from_bytes(image.uri(), image.bytes().clone())
                        .fit_to_exact_size(size),
                );
            }
            TileStatus::Pending => {
                ui.allocate_ui_with_layout(size, Layout::centered_and_justified(egui::Direction::TopDown), |ui| {
                    ui.add(egui::Spinner::new().size(36.0));
                });
            }
            TileStatus::Error(message) => {
                ui.allocate_ui_with_layout(size, Layout::top_down(Align::Center), |ui| {
                    ui.add_space(PHOTO_SIZE * 0.3);
                    ui.label(RichText::new("Generation failed").color(Color32::from_rgb(180, 40, 40)));
                    ui.add(egui::Label::new(RichText::new(message).small()).wrap());
                });
            }
        }
    }
}

impl View for PolaroidCard<'_> {
    fn draw(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        egui::Frame::default()
            .fill(Color32::WHITE)
            .stroke(Stroke::new(1.0, Color32::from_gray(215)))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(PHOTO_SIZE);
                ui.vertical_centered(|ui| {
                    self.draw_photo(ui);
                    ui.add_space(6.0);
                    ui.label(
                        RichText::new(self.label)
                            .size(20.0)
                            .italics()
                            .color(Color32::from_gray(50)),
                    );
                    ui.horizontal(|ui| {
                        let idle = !self.status.is_pending();
                        if ui
                            .add_enabled(idle, egui::Button::new("Regenerate"))
                            .clicked()
                        {
                            actions.push(UiAction::Regenerate(self.label.to_string()));
                        }
                        if ui
                            .add_enabled(self.status.image().is_some(), egui::Button::new("Save"))
                            .clicked()
                        {
                            actions.push(UiAction::SaveImage(self.label.to_string()));
                        }
                    });
                });
            });
    }
}

/// Initial position of card `index` out of `count`, spread over `area` with a
/// little jitter so the board looks hand-placed. Cards can be dragged afterwards.
pub fn default_card_position(index: usize, count: usize, area: Rect) -> Pos2 {
    let columns = ((area.width() / (CARD_WIDTH + 24.0)).floor() as usize).clamp(1, count.max(1));
    let rows = count.div_ceil(columns).max(1);
    let col = index % columns;
    let row = index / columns;

    let step_x = (area.width() - CARD_WIDTH).max(0.0) / (columns.saturating_sub(1).max(1)) as f32;
    let step_y = (area.height() - CARD_HEIGHT).max(0.0) / (rows.saturating_sub(1).max(1)) as f32;
    let jitter = (((index * 37) % 11) as f32 - 5.0) * 2.0;

    let x = if columns == 1 {
        area.center().x - CARD_WIDTH / 2.0
    } else {
        area.left() + col as f32 * step_x
    };
    let y = area.top() + row as f32 * step_y.min(CARD_HEIGHT + 24.0);
    Pos2::new(x + jitter, y - jitter / 2.0)
}
