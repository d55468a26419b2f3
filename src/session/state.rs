use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::TransformMode;
use crate::common::{GeneratedImage, SourceImage};
use crate::error::{AlbumError, SessionError};
use crate::generation::{GenerationEvent, GenerationRequest};
use crate::session::tile::TileStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ImageUploaded,
    Generating,
    ResultsShown,
}

/// Everything the UI knows about the current portrait and its variations.
#[derive(Debug)]
pub struct Session {
    stage: Stage,
    source: Option<Arc<SourceImage>>,
    mode: Option<TransformMode>,
    batch: Option<Uuid>,
    tiles: IndexMap<String, TileStatus>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            source: None,
            mode: None,
            batch: None,
            tiles: IndexMap::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn source(&self) -> Option<&Arc<SourceImage>> {
        self.source.as_ref()
    }

    pub fn mode(&self) -> Option<TransformMode> {
        self.mode
    }

    pub fn batch(&self) -> Option<Uuid> {
        self.batch
    }

    pub fn tiles(&self) -> &IndexMap<String, TileStatus> {
        &self.tiles
    }

    pub fn tile(&self, label: &str) -> Option<&TileStatus> {
        self.tiles.get(label)
    }

    pub fn pending_count(&self) -> usize {
        self.tiles.values().filter(|t| t.is_pending()).count()
    }

    pub fn upload(&mut self, source: SourceImage) {
        info!(
            "Uploaded {} image {}x{}",
            source.mime_type(),
            source.dimensions().0,
            source.dimensions().1
        );
        self.source = Some(Arc::new(source));
        self.clear_results();
        self.stage = Stage::ImageUploaded;
    }

    /// Marks every label of `mode` pending and returns one request per label.
    pub fn start_batch(&mut self, mode: TransformMode) -> Result<Vec<GenerationRequest>, SessionError> {
        let source = self.source.clone().ok_or(SessionError::NoSourceImage)?;
        if self.stage == Stage::Generating {
            return Err(SessionError::AlreadyGenerating);
        }

        let batch = Uuid::new_v4();
        self.batch = Some(batch);
        self.mode = Some(mode);
        self.tiles = mode
            .transforms()
            .iter()
            .map(|t| (t.label.to_string(), TileStatus::Pending))
            .collect();
        self.stage = Stage::Generating;
        info!("Starting batch {} with {} transforms ({})", batch, self.tiles.len(), mode);

        Ok(mode
            .transforms()
            .iter()
            .map(|t| GenerationRequest {
                batch,
                label: t.label.to_string(),
                description: t.description.to_string(),
                mode,
                source: source.clone(),
            })
            .collect())
    }

    /// Records a finished request. Returns false if the event was stale.
    pub fn apply(&mut self, event: GenerationEvent) -> bool {
        if self.batch != Some(event.batch) {
            debug!("Dropping result for '{}' from stale batch {}", event.label, event.batch);
            return false;
        }
        let Some(tile) = self.tiles.get_mut(&event.label) else {
            debug!("Dropping result for unknown label '{}'", event.label);
            return false;
        };

        *tile = match event.outcome {
            Ok(image) => TileStatus::Done(image),
            Err(e) => TileStatus::Error(e.to_string()),
        };

        if self.stage == Stage::Generating && self.pending_count() == 0 {
            info!("Batch {} finished", event.batch);
            self.stage = Stage::ResultsShown;
        }
        true
    }

    /// Marks one label pending again, unless it is already pending.
    pub fn begin_regenerate(&mut self, label: &str) -> Option<GenerationRequest> {
        let source = self.source.clone()?;
        let mode = self.mode?;
        let batch = self.batch?;
        let transform = mode.find(label)?;
        let tile = self.tiles.get_mut(label)?;
        if tile.is_pending() {
            debug!("'{}' is already pending, ignoring regenerate", label);
            return None;
        }

        *tile = TileStatus::Pending;
        Some(GenerationRequest {
            batch,
            label: transform.label.to_string(),
            description: transform.description.to_string(),
            mode,
            source,
        })
    }

    pub fn is_album_ready(&self) -> bool {
        !self.tiles.is_empty() && self.tiles.values().all(|t| t.image().is_some())
    }

    /// Completed images in catalog order, or the labels that are not done yet.
    pub fn album_images(&self) -> Result<IndexMap<String, GeneratedImage>, AlbumError> {
        if self.tiles.is_empty() {
            return Err(AlbumError::Empty);
        }
        let missing: Vec<String> = self
            .tiles
            .iter()
            .filter(|(_, t)| t.image().is_none())
            .map(|(label, _)| label.clone())
            .collect();
        if !missing.is_empty() {
            return Err(AlbumError::Incomplete { missing });
        }
        Ok(self
            .tiles
            .iter()
            .filter_map(|(label, t)| t.image().map(|i| (label.clone(), i.clone())))
            .collect())
    }

    pub fn album_subtitle(&self) -> &'static str {
        self.mode.map(TransformMode::album_subtitle).unwrap_or_default()
    }

    /// Keeps the upload but drops all results so another mode can be picked.
    pub fn back_to_modes(&mut self) {
        if self.source.is_none() {
            self.reset();
            return;
        }
        self.clear_results();
        self.stage = Stage::ImageUploaded;
    }

    pub fn reset(&mut self) {
        info!("Resetting session");
        *self = Self::new();
    }

    fn clear_results(&mut self) {
        self.batch = None;
        self.mode = None;
        self.tiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::portrait::fixtures::png_bytes;
    use crate::error::GenerationError;

    fn uploaded() -> Session {
        let mut session = Session::new();
        session.upload(SourceImage::from_bytes(png_bytes(10, 10, [100, 100, 100])).unwrap());
        session
    }

    fn done(request: &GenerationRequest) -> GenerationEvent {
        GenerationEvent::new(
            request,
            Ok(GeneratedImage::new(png_bytes(2, 2, [0, 0, 0]), "image/png")),
        )
    }

    fn failed(request: &GenerationRequest) -> GenerationEvent {
        GenerationEvent::new(request, Err(GenerationError::NoImage(None)))
    }

    #[test]
    fn test_start_batch_requires_upload() {
        let mut session = Session::new();
        assert_eq!(
            session.start_batch(TransformMode::Creative).unwrap_err(),
            SessionError::NoSourceImage
        );
        assert_eq!(session.stage(), Stage::Idle);
    }

    #[test]
    fn test_batch_reaches_results_when_all_terminal() {
        let mut session = uploaded();
        let requests = session.start_batch(TransformMode::Ethnicity).unwrap();
        assert_eq!(session.stage(), Stage::Generating);
        assert_eq!(requests.len(), session.tiles().len());
        assert!(session.tiles().values().all(TileStatus::is_pending));
        assert_eq!(
            session.start_batch(TransformMode::Creative).unwrap_err(),
            SessionError::AlreadyGenerating
        );

        for (i, request) in requests.iter().enumerate() {
            assert_eq!(session.stage(), Stage::Generating);
            let event = if i % 2 == 0 { done(request) } else { failed(request) };
            assert!(session.apply(event));
        }
        assert_eq!(session.stage(), Stage::ResultsShown);
        assert!(session.tiles().values().all(TileStatus::is_terminal));
        assert_eq!(session.tiles().values().filter(|t| t.error().is_some()).count(), 3);
    }

    #[test]
    fn test_regenerate_pending_label_is_noop() {
        let mut session = uploaded();
        let requests = session.start_batch(TransformMode::Creative).unwrap();
        assert!(session.begin_regenerate("Anime").is_none());

        session.apply(failed(&requests[0]));
        let again = session.begin_regenerate(&requests[0].label).unwrap();
        assert_eq!(again.batch, requests[0].batch);
        assert!(session.tile(&requests[0].label).unwrap().is_pending());
        assert!(session.begin_regenerate(&requests[0].label).is_none());
        assert!(session.begin_regenerate("Not A Label").is_none());
    }

    #[test]
    fn test_album_refused_until_every_label_done() {
        let mut session = uploaded();
        assert!(matches!(session.album_images(), Err(AlbumError::Empty)));

        let requests = session.start_batch(TransformMode::Creative).unwrap();
        for request in &requests[1..] {
            session.apply(done(request));
        }
        session.apply(failed(&requests[0]));
        match session.album_images() {
            Err(AlbumError::Incomplete { missing }) => assert_eq!(missing, vec!["Anime".to_string()]),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!session.is_album_ready());

        let retry = session.begin_regenerate("Anime").unwrap();
        assert!(matches!(session.album_images(), Err(AlbumError::Incomplete { .. })));
        session.apply(done(&retry));

        let images = session.album_images().unwrap();
        let labels: Vec<_> = images.keys().cloned().collect();
        assert_eq!(labels, TransformMode::Creative.labels());
        assert!(session.is_album_ready());
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut session = uploaded();
        let old = session.start_batch(TransformMode::Creative).unwrap();
        session.back_to_modes();
        assert_eq!(session.stage(), Stage::ImageUploaded);
        assert!(session.source().is_some());

        let fresh = session.start_batch(TransformMode::Creative).unwrap();
        assert!(!session.apply(done(&old[0])));
        assert!(session.tile(&old[0].label).unwrap().is_pending());
        assert!(session.apply(done(&fresh[0])));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = uploaded();
        let requests = session.start_batch(TransformMode::Ethnicity).unwrap();
        session.apply(done(&requests[0]));

        session.reset();
        assert_eq!(session.stage(), Stage::Idle);
        assert!(session.source().is_none());
        assert!(session.mode().is_none());
        assert!(session.batch().is_none());
        assert!(session.tiles().is_empty());
        assert!(!session.apply(done(&requests[1])));
    }
}
