use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::album::AlbumComposer;
use crate::catalog::TransformMode;
use crate::common::SourceImage;
use crate::error::{AlbumError, AppError};
use crate::generation::{
    limited_service, regenerate, GenerationEvent, GenerationQueue, ImageGenerator,
    LimitedGenerationService,
};
use crate::session::{Session, Stage};

type AlbumResult = (Option<Uuid>, Result<Vec<u8>, AlbumError>);

/// Something the view layer has to react to after [`StudioController::poll`].
#[derive(Debug)]
pub enum StudioUpdate {
    TileFinished { label: String },
    BatchFinished,
    AlbumReady(Vec<u8>),
    AlbumFailed(AlbumError),
}

/// Owns the session and the background work that feeds it.
pub struct StudioController {
    session: Session,
    runtime: Handle,
    service: LimitedGenerationService,
    queue: GenerationQueue<LimitedGenerationService>,
    generator_name: String,
    composer: Arc<AlbumComposer>,
    event_tx: mpsc::UnboundedSender<GenerationEvent>,
    event_rx: mpsc::UnboundedReceiver<GenerationEvent>,
    album_tx: mpsc::UnboundedSender<AlbumResult>,
    album_rx: mpsc::UnboundedReceiver<AlbumResult>,
    album_in_progress: bool,
}

impl StudioController {
    pub fn new(
        runtime: Handle,
        generator: Arc<dyn ImageGenerator>,
        concurrency: usize,
        composer: AlbumComposer,
    ) -> Self {
        let generator_name = generator.name().to_string();
        let service = limited_service(generator, concurrency);
        let queue = GenerationQueue::new(service.clone(), concurrency, runtime.clone());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (album_tx, album_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            runtime,
            service,
            queue,
            generator_name,
            composer: Arc::new(composer),
            event_tx,
            event_rx,
            album_tx,
            album_rx,
            album_in_progress: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn generator_name(&self) -> &str {
        &self.generator_name
    }

    pub fn workers(&self) -> usize {
        self.queue.workers()
    }

    pub fn album_in_progress(&self) -> bool {
        self.album_in_progress
    }

    pub fn upload_path(&mut self, path: &Path) -> Result<(), AppError> {
        let source = SourceImage::from_path(path)?;
        self.session.upload(source);
        Ok(())
    }

    pub fn upload_bytes(&mut self, bytes: Vec<u8>) -> Result<(), AppError> {
        let source = SourceImage::from_bytes(bytes)?;
        self.session.upload(source);
        Ok(())
    }

    pub fn choose_mode(&mut self, mode: TransformMode) -> Result<(), AppError> {
        let requests = self.session.start_batch(mode)?;
        self.queue.spawn(requests, self.event_tx.clone());
        Ok(())
    }

    /// Re-runs one label. Returns false when the label is already pending.
    pub fn regenerate(&mut self, label: &str) -> bool {
        match self.session.begin_regenerate(label) {
            Some(request) => {
                regenerate(
                    &self.runtime,
                    self.service.clone(),
                    request,
                    self.event_tx.clone(),
                );
                true
            }
            None => false,
        }
    }

    /// Starts composing the album, refusing while any tile is unfinished.
    pub fn request_album(&mut self) -> Result<(), AlbumError> {
        let images = self.session.album_images()?;
        let labels: Vec<String> = images.keys().cloned().collect();
        let subtitle = self.session.album_subtitle().to_string();
        let composer = self.composer.clone();
        let album_tx = self.album_tx.clone();
        let batch = self.session.batch();

        info!("Composing album with {} images", labels.len());
        self.album_in_progress = true;
        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                composer.compose(&images, &labels, &subtitle)
            })
            .await
            .unwrap_or_else(|e| {
                error!("Album task failed: {}", e);
                Err(AlbumError::Task(e.to_string()))
            });
            if album_tx.send((batch, result)).is_err() {
                warn!("Album finished after the UI went away");
            }
        });
        Ok(())
    }

    /// Pending tiles and any album being composed are abandoned; their
    /// results are dropped when they arrive.
    pub fn back_to_modes(&mut self) {
        self.session.back_to_modes();
        self.album_in_progress = false;
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.album_in_progress = false;
    }

    /// Applies everything the background tasks finished since the last call.
    pub fn poll(&mut self) -> Vec<StudioUpdate> {
        let mut updates = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => {
                    let label = event.label.clone();
                    let was_generating = self.session.stage() == Stage::Generating;
                    if self.session.apply(event) {
                        updates.push(StudioUpdate::TileFinished { label });
                        if was_generating && self.session.stage() == Stage::ResultsShown {
                            updates.push(StudioUpdate::BatchFinished);
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("Generation event channel disconnected");
                    break;
                }
            }
        }
        loop {
            match self.album_rx.try_recv() {
                Ok((batch, _)) if batch != self.session.batch() => {
                    debug!("Dropping album composed for a previous batch");
                }
                Ok((_, result)) => {
                    self.album_in_progress = false;
                    updates.push(match result {
                        Ok(png) => StudioUpdate::AlbumReady(png),
                        Err(e) => StudioUpdate::AlbumFailed(e),
                    });
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("Album channel disconnected");
                    break;
                }
            }
        }
        updates
    }
}
