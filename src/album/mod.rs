//! Album page compositor.
//!
//! Completed variations are laid out as tilted polaroids on one printable page,
//! written as SVG and rasterized to PNG.

pub mod layout;
pub mod render;

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;

use crate::common::GeneratedImage;
use crate::config::AlbumSettings;
use crate::error::AlbumError;

pub use layout::{layout_page, CardLayout, PageLayout};

pub struct AlbumComposer {
    settings: AlbumSettings,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl AlbumComposer {
    /// Creates a composer that renders text with the system fonts.
    pub fn new(settings: AlbumSettings) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        info!("Album composer loaded {} font faces", db.len());
        Self::with_fontdb(settings, Arc::new(db))
    }

    pub fn with_fontdb(settings: AlbumSettings, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { settings, fontdb }
    }

    pub fn settings(&self) -> &AlbumSettings {
        &self.settings
    }

    /// Composes one PNG page from `images`, one card per entry of `labels`.
    ///
    /// Every label must have an image; the page is refused otherwise.
    pub fn compose(
        &self,
        images: &IndexMap<String, GeneratedImage>,
        labels: &[String],
        subtitle: &str,
    ) -> Result<Vec<u8>, AlbumError> {
        if labels.is_empty() {
            return Err(AlbumError::Empty);
        }
        let missing: Vec<String> = labels
            .iter()
            .filter(|label| !images.contains_key(label.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AlbumError::Incomplete { missing });
        }

        let page = layout_page(&self.settings, labels);
        let photos = page
            .cards
            .iter()
            .map(|card| -> Result<String, AlbumError> {
                let decoded = images[card.label.as_str()].decode().map_err(|source| {
                    AlbumError::Decode {
                        label: card.label.clone(),
                        source,
                    }
                })?;
                Ok(render::photo_data_uri(&decoded, card.photo_size)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let svg = render::page_svg(
            &page,
            &render::PageText {
                title: &self.settings.title,
                subtitle,
                footer: &self.settings.footer,
                background: &self.settings.background,
            },
            &photos,
        );
        let png = render::rasterize_png(&svg, page.width, page.height, self.fontdb.clone())?;
        info!(
            "Composed album page {}x{} with {} photos ({} bytes)",
            page.width,
            page.height,
            labels.len(),
            png.len()
        );
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::portrait::fixtures::png_bytes;
    use image::GenericImageView;

    fn composer() -> AlbumComposer {
        AlbumComposer::with_fontdb(
            AlbumSettings {
                page_width: 300,
                page_height: 420,
                ..AlbumSettings::default()
            },
            Arc::new(usvg::fontdb::Database::new()),
        )
    }

    fn images(labels: &[&str]) -> IndexMap<String, GeneratedImage> {
        labels
            .iter()
            .map(|l| {
                (
                    l.to_string(),
                    GeneratedImage::new(png_bytes(32, 24, [200, 30, 30]), "image/png"),
                )
            })
            .collect()
    }

    #[test]
    fn test_compose_refuses_missing_labels() {
        let labels = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        match composer().compose(&images(&["A", "C"]), &labels, "sub") {
            Err(AlbumError::Incomplete { missing }) => assert_eq!(missing, vec!["B".to_string()]),
            other => panic!("unexpected: {:?}", other.map(|b| b.len())),
        }
        assert!(matches!(
            composer().compose(&images(&["A"]), &[], "sub"),
            Err(AlbumError::Empty)
        ));
    }

    #[test]
    fn test_compose_renders_page_png() {
        let labels = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let png = composer().compose(&images(&["A", "B", "C"]), &labels, "sub").unwrap();
        let page = image::load_from_memory(&png).unwrap();
        assert_eq!(page.dimensions(), (300, 420));

        // Corner shows the paper background, the first card center shows the photo.
        let corner = page.get_pixel(1, 1).0;
        assert_eq!(&corner[..3], &[0xfd, 0xf5, 0xe6]);
        let layout = layout_page(composer().settings(), &labels);
        let card = &layout.cards[0];
        let (px, py) = (
            card.x + card.photo_inset + card.photo_size / 2.0,
            card.y + card.photo_inset + card.photo_size / 2.0,
        );
        let center = page.get_pixel(px as u32, py as u32).0;
        assert!(center[0] > 150 && center[1] < 90, "{center:?}");
    }

    #[test]
    fn test_compose_reports_undecodable_image() {
        let labels = vec!["A".to_string()];
        let mut broken = IndexMap::new();
        broken.insert("A".to_string(), GeneratedImage::new(b"nope".to_vec(), "image/png"));
        assert!(matches!(
            composer().compose(&broken, &labels, ""),
            Err(AlbumError::Decode { .. })
        ));
    }
}
