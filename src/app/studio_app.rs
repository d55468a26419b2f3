use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{error, info, warn};

use crate::album::AlbumComposer;
use crate::app::controller::{StudioController, StudioUpdate};
use crate::app::views::footer::Footer;
use crate::app::views::mode_picker::ModePickerView;
use crate::app::views::polaroid_card::{default_card_position, PolaroidCard};
use crate::app::views::upload_view::UploadView;
use crate::app::views::{UiAction, View};
use crate::common::ACCEPTED_EXTENSIONS;
use crate::config::Settings;
use crate::error::{AlbumError, AppError};
use crate::generation::GeminiClient;
use crate::session::Stage;

const APP_TITLE: &str = "Portrait Album";

pub struct StudioApp {
    controller: StudioController,
    alert: Option<String>,
    status: String,
    errors: Vec<AppError>,
}

impl StudioApp {
    pub fn new(controller: StudioController) -> Self {
        Self {
            controller,
            alert: None,
            status: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn start_gui(settings: &Settings, runtime: Handle) -> Result<(), AppError> {
        let client = GeminiClient::new(&settings.api)?;
        if settings.api.api_key.is_none() {
            warn!("No API key configured, every generation will fail until one is set");
        }
        let composer = AlbumComposer::new(settings.album.clone());
        let controller = StudioController::new(
            runtime,
            Arc::new(client),
            settings.generation.concurrency,
            composer,
        );

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(egui::vec2(settings.ui.window_width, settings.ui.window_height))
                .with_title(APP_TITLE)
                .with_drag_and_drop(true),
            ..Default::default()
        };

        eframe::run_native(
            APP_TITLE,
            options,
            Box::new(move |cc| {
                egui_extras::install_image_loaders(&cc.egui_ctx);
                Ok(Box::new(StudioApp::new(controller)))
            }),
        )?;
        Ok(())
    }

    fn report(&mut self, err: AppError) {
        error!("{}", err);
        self.errors.push(err);
    }

    fn handle_action(&mut self, action: UiAction) {
        match action {
            UiAction::PickFile => {
                let picked = rfd::FileDialog::new()
                    .set_title("Choose a portrait")
                    .add_filter("Images", ACCEPTED_EXTENSIONS)
                    .pick_file();
                if let Some(path) = picked {
                    if let Err(e) = self.controller.upload_path(&path) {
                        self.alert = Some(e.to_string());
                        self.report(e);
                    }
                }
            }
            UiAction::ChooseMode(mode) => match self.controller.choose_mode(mode) {
                Ok(()) => self.status = format!("Generating {}…", mode),
                Err(e) => self.report(e),
            },
            UiAction::Regenerate(label) => {
                if self.controller.regenerate(&label) {
                    self.status = format!("Regenerating {label}…");
                }
            }
            UiAction::SaveImage(label) => self.save_image(&label),
            UiAction::DownloadAlbum => {
                if self.controller.album_in_progress() {
                    return;
                }
                match self.controller.request_album() {
                    Ok(()) => self.status = "Composing album…".to_string(),
                    Err(AlbumError::Incomplete { missing }) => {
                        self.alert = Some(format!(
                            "Please wait for all images to finish before downloading the album.\n\nStill missing: {}",
                            missing.join(", ")
                        ));
                    }
                    Err(e) => self.report(e.into()),
                }
            }
            UiAction::BackToModes => {
                self.controller.back_to_modes();
                self.status.clear();
            }
            UiAction::StartOver => {
                self.controller.reset();
                self.status.clear();
            }
        }
    }

    fn handle_update(&mut self, update: StudioUpdate) {
        match update {
            StudioUpdate::TileFinished { label } => {
                if let Some(message) = self
                    .controller
                    .session()
                    .tile(&label)
                    .and_then(|t| t.error())
                {
                    self.status = format!("{label} failed: {message}");
                }
            }
            StudioUpdate::BatchFinished => {
                let failed = self
                    .controller
                    .session()
                    .tiles()
                    .values()
                    .filter(|t| t.error().is_some())
                    .count();
                if failed == 0 {
                    self.status = "All variations finished".to_string();
                } else {
                    warn!("Batch finished with {} failed variations", failed);
                }
            }
            StudioUpdate::AlbumReady(png) => {
                self.status.clear();
                let name = format!(
                    "portrait-album-{}.png",
                    chrono::Local::now().format("%Y%m%d-%H%M%S")
                );
                if let Some(path) = save_dialog(&name, &["png"]) {
                    self.write_file(path, &png);
                }
            }
            StudioUpdate::AlbumFailed(e) => {
                self.status.clear();
                self.alert = Some(e.to_string());
                self.report(e.into());
            }
        }
    }

    fn save_image(&mut self, label: &str) {
        let Some(image) = self
            .controller
            .session()
            .tile(label)
            .and_then(|t| t.image())
            .cloned()
        else {
            return;
        };
        let ext = image.file_extension();
        let name = format!("{}.{ext}", label.to_lowercase().replace(' ', "-"));
        if let Some(path) = save_dialog(&name, &[ext]) {
            self.write_file(path, image.bytes());
        }
    }

    fn write_file(&mut self, path: PathBuf, bytes: &[u8]) {
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                info!("Saved {}", path.display());
                self.status = format!("Saved {}", path.display());
            }
            Err(e) => self.report(e.into()),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if !matches!(self.controller.session().stage(), Stage::Idle | Stage::ImageUploaded) {
            return;
        }
        let result = match (file.bytes, file.path) {
            (Some(bytes), _) => self.controller.upload_bytes(bytes.to_vec()),
            (None, Some(path)) => self.controller.upload_path(&path),
            (None, None) => return,
        };
        if let Err(e) = result {
            self.alert = Some(e.to_string());
            self.report(e);
        }
    }

    fn draw_board(&self, ctx: &egui::Context, area: egui::Rect, actions: &mut Vec<UiAction>) {
        let session = self.controller.session();
        let batch = session.batch();
        let count = session.tiles().len();
        for (index, (label, status)) in session.tiles().iter().enumerate() {
            egui::Area::new(egui::Id::new(("polaroid", batch, label.as_str())))
                .default_pos(default_card_position(index, count, area))
                .movable(true)
                .constrain_to(ctx.screen_rect())
                .show(ctx, |ui| {
                    PolaroidCard::new(label, status).draw(ui, actions);
                });
        }
    }

    fn draw_toolbar(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let session = self.controller.session();
        ui.horizontal(|ui| {
            if let Some(mode) = session.mode() {
                ui.heading(mode.title());
                ui.separator();
            }
            let album_label = if self.controller.album_in_progress() {
                "Composing album…"
            } else {
                "Download album"
            };
            if ui
                .add_enabled(!self.controller.album_in_progress(), egui::Button::new(album_label))
                .clicked()
            {
                actions.push(UiAction::DownloadAlbum);
            }
            if ui.button("Try another style").clicked() {
                actions.push(UiAction::BackToModes);
            }
            if ui.button("Start over").clicked() {
                actions.push(UiAction::StartOver);
            }
        });
    }

    fn draw_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        let response = egui::Modal::new(egui::Id::new("alert")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.label(message);
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });
        if response.inner || response.should_close() {
            self.alert = None;
        }
    }
}

fn save_dialog(file_name: &str, extensions: &[&str]) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Save image")
        .set_file_name(file_name)
        .add_filter("Image", extensions)
        .save_file()
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for update in self.controller.poll() {
            self.handle_update(update);
        }
        self.handle_dropped_files(ctx);

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(APP_TITLE);
        });

        egui::TopBottomPanel::bottom("footer")
            .resizable(false)
            .show(ctx, |ui| {
                Footer {
                    generator: self.controller.generator_name(),
                    workers: self.controller.workers(),
                    pending: self.controller.session().pending_count(),
                    status: &self.status,
                    errors: &self.errors,
                }
                .draw(ui, &mut actions);
            });

        let board_area = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let session = self.controller.session();
                match (session.stage(), session.source()) {
                    (Stage::Idle, _) | (_, None) => {
                        UploadView.draw(ui, &mut actions);
                        None
                    }
                    (Stage::ImageUploaded, Some(source)) => {
                        ModePickerView::new(source).draw(ui, &mut actions);
                        None
                    }
                    (Stage::Generating | Stage::ResultsShown, Some(_)) => {
                        self.draw_toolbar(ui, &mut actions);
                        ui.separator();
                        Some(ui.available_rect_before_wrap())
                    }
                }
            })
            .inner;

        if let Some(area) = board_area {
            self.draw_board(ctx, area, &mut actions);
        }
        self.draw_alert(ctx);

        for action in actions {
            self.handle_action(action);
        }

        if self.controller.session().pending_count() > 0 || self.controller.album_in_progress() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
