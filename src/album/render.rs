use std::fmt::Write as _;
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::album::layout::{CardLayout, PageLayout};
use crate::error::AlbumError;

const HAND_FONTS: &str = "Caveat, 'Permanent Marker', 'Comic Neue', cursive, sans-serif";
const TITLE_FONTS: &str = "'Permanent Marker', Caveat, serif";

pub struct PageText<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub footer: &'a str,
    pub background: &'a str,
}

/// Square-crops `image` to the photo size of a card and wraps it in a data URI.
pub fn photo_data_uri(image: &DynamicImage, size: f32) -> Result<String, image::ImageError> {
    let side = size.round().max(1.0) as u32;
    let cropped = image.resize_to_fill(side, side, FilterType::Lanczos3).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    cropped.write_to(&mut out, ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(out.into_inner())
    ))
}

/// Writes the page as an SVG document. `photos` holds one data URI per card, in order.
pub fn page_svg(layout: &PageLayout, text: &PageText<'_>, photos: &[String]) -> String {
    let mut svg = String::with_capacity(photos.iter().map(String::len).sum::<usize>() + 8192);
    let w = layout.width;
    let h = layout.height;
    let cx = w as f32 / 2.0;

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
        escape(text.background)
    );
    push_text(&mut svg, cx, layout.title_y, layout.title_size, TITLE_FONTS, "#2b2b2b", text.title);
    push_text(&mut svg, cx, layout.subtitle_y, layout.subtitle_size, HAND_FONTS, "#5a5046", text.subtitle);

    for (card, photo) in layout.cards.iter().zip(photos) {
        push_card(&mut svg, card, photo);
    }

    push_text(&mut svg, cx, layout.footer_y, layout.footer_size, HAND_FONTS, "#8a7f72", text.footer);
    svg.push_str("</svg>");
    svg
}

fn push_card(svg: &mut String, card: &CardLayout, photo: &str) {
    let (cx, cy) = card.center();
    let shadow = card.width * 0.015;
    let _ = write!(
        svg,
        r#"<g transform="rotate({:.3} {cx:.1} {cy:.1}) translate({:.1} {:.1})">"#,
        card.rotation_deg, card.x, card.y
    );
    let _ = write!(
        svg,
        r##"<rect x="{shadow:.1}" y="{shadow:.1}" width="{:.1}" height="{:.1}" fill="#000000" fill-opacity="0.18"/>"##,
        card.width, card.height
    );
    let _ = write!(
        svg,
        r##"<rect x="0" y="0" width="{:.1}" height="{:.1}" fill="#ffffff" stroke="#e4ded4" stroke-width="2"/>"##,
        card.width, card.height
    );
    let _ = write!(
        svg,
        r#"<image x="{inset:.1}" y="{inset:.1}" width="{size:.1}" height="{size:.1}" preserveAspectRatio="xMidYMid slice" xlink:href="{photo}"/>"#,
        inset = card.photo_inset,
        size = card.photo_size,
    );
    push_text(
        svg,
        card.width / 2.0,
        card.caption_y,
        card.caption_size,
        HAND_FONTS,
        "#333333",
        &card.label,
    );
    svg.push_str("</g>");
}

fn push_text(svg: &mut String, x: f32, y: f32, size: f32, family: &str, fill: &str, content: &str) {
    if content.is_empty() {
        return;
    }
    let _ = write!(
        svg,
        r#"<text x="{x:.1}" y="{y:.1}" font-size="{size:.1}" font-family="{family}" fill="{fill}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
        escape(content)
    );
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rasterizes an SVG page and encodes it as PNG.
pub fn rasterize_png(
    svg: &str,
    width: u32,
    height: u32,
    fontdb: Arc<usvg::fontdb::Database>,
) -> Result<Vec<u8>, AlbumError> {
    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(AlbumError::Pixmap { width, height })?;
    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // The page background is opaque, so premultiplied and straight RGBA agree.
    let page = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or(AlbumError::Pixmap { width, height })?;
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(page).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
