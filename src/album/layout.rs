use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AlbumSettings;

/// Maximum tilt applied to a card, in degrees.
pub const MAX_TILT_DEG: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: u32,
    pub height: u32,
    pub title_y: f32,
    pub title_size: f32,
    pub subtitle_y: f32,
    pub subtitle_size: f32,
    pub footer_y: f32,
    pub footer_size: f32,
    pub cards: Vec<CardLayout>,
}

/// Placement of one polaroid on the page. `x`/`y` is the card's top-left corner
/// before rotation; the rotation pivots around the card center.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub photo_inset: f32,
    pub photo_size: f32,
    pub caption_y: f32,
    pub caption_size: f32,
    pub rotation_deg: f32,
}

impl CardLayout {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Tilt for a card, stable for a given label.
pub fn tilt_for(label: &str) -> f32 {
    let seed = label
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |hash, b| {
            (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
    StdRng::seed_from_u64(seed).random_range(-MAX_TILT_DEG..=MAX_TILT_DEG)
}

/// Lays `labels` out row by row on a grid of `settings.columns` columns.
pub fn layout_page(settings: &AlbumSettings, labels: &[String]) -> PageLayout {
    let width = settings.page_width as f32;
    let height = settings.page_height as f32;
    let columns = settings.columns.max(1) as usize;
    let rows = labels.len().div_ceil(columns).max(1);

    let margin = width * 0.06;
    let header = height * 0.12;
    let footer = height * 0.05;
    let gutter = width * 0.04;

    let cell_w = (width - 2.0 * margin - gutter * (columns as f32 - 1.0)) / columns as f32;
    let cell_h = (height - header - footer - gutter * (rows as f32 - 1.0)) / rows as f32;

    // Polaroid proportions: square photo, thin sides, a deep bottom strip for the caption.
    let card_w = cell_w.min(cell_h / 1.2) * 0.92;
    let inset = card_w * 0.06;
    let photo = card_w - 2.0 * inset;
    let card_h = inset + photo + card_w * 0.2;

    let cards = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let row = i / columns;
            let col = i % columns;
            let cell_x = margin + col as f32 * (cell_w + gutter);
            let cell_y = header + row as f32 * (cell_h + gutter);
            CardLayout {
                label: label.clone(),
                x: cell_x + (cell_w - card_w) / 2.0,
                y: cell_y + (cell_h - card_h) / 2.0,
                width: card_w,
                height: card_h,
                photo_inset: inset,
                photo_size: photo,
                caption_y: inset + photo + card_w * 0.13,
                caption_size: card_w * 0.085,
                rotation_deg: tilt_for(label),
            }
        })
        .collect();

    PageLayout {
        width: settings.page_width,
        height: settings.page_height,
        title_y: header * 0.45,
        title_size: height * 0.035,
        subtitle_y: header * 0.75,
        subtitle_size: height * 0.018,
        footer_y: height - footer * 0.4,
        footer_size: height * 0.012,
        cards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Look {i}")).collect()
    }

    #[test]
    fn test_cards_stay_on_page_and_do_not_overlap() {
        let settings = AlbumSettings::default();
        let page = layout_page(&settings, &labels(6));
        assert_eq!(page.cards.len(), 6);

        for card in &page.cards {
            assert!(card.x >= 0.0 && card.x + card.width <= page.width as f32);
            assert!(card.y > page.subtitle_y);
            assert!(card.y + card.height < page.footer_y);
            assert!(card.rotation_deg.abs() <= MAX_TILT_DEG);
            assert!(card.caption_y < card.height);
        }
        for (i, a) in page.cards.iter().enumerate() {
            for b in &page.cards[i + 1..] {
                let apart_x = a.x + a.width <= b.x || b.x + b.width <= a.x;
                let apart_y = a.y + a.height <= b.y || b.y + b.height <= a.y;
                assert!(apart_x || apart_y, "{} overlaps {}", a.label, b.label);
            }
        }
    }

    #[test]
    fn test_odd_count_uses_extra_row() {
        let settings = AlbumSettings::default();
        let page = layout_page(&settings, &labels(3));
        assert_eq!(page.cards[0].y, page.cards[1].y);
        assert!(page.cards[2].y > page.cards[0].y);
        assert_eq!(page.cards[2].x, page.cards[0].x);
    }

    #[test]
    fn test_tilt_is_stable_per_label() {
        assert_eq!(tilt_for("Anime"), tilt_for("Anime"));
        let tilts: Vec<f32> = labels(6).iter().map(|l| tilt_for(l)).collect();
        assert!(tilts.iter().any(|t| (t - tilts[0]).abs() > f32::EPSILON));
    }
}
