//! Debug visualization of extracted segments
//!
//! Diagnostic output only; nothing downstream consumes the rendered raster.

use crate::types::{Polygon, Segment};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::debug;

const BORDER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_FILL: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
const GLYPH_SCALE: i32 = 2;

/// Rendering options for [`render_debug`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Also draw each segment's confidence score next to its ID
    pub label_scores: bool,
}

/// Composite segment fills, borders and ID labels over a copy of `image`.
///
/// Fills are blended at 50% opacity so the source stays visible underneath;
/// borders and labels are drawn solid on top. Segments are rendered in ID
/// order, so higher IDs overlay lower ones where polygons intersect.
pub fn render_debug(image: &RgbImage, segments: &[Segment], options: RenderOptions) -> RgbImage {
    let mut canvas = image.clone();
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 || segments.is_empty() {
        return canvas;
    }

    let mut overlay = canvas.clone();
    for segment in segments {
        let points = polygon_pixels(&segment.polygon, width, height);
        if points.len() >= 3 {
            draw_polygon_mut(&mut overlay, &points, parse_hex(&segment.color));
        }
    }
    blend_half(&mut canvas, &overlay);

    for segment in segments {
        let points = polygon_pixels(&segment.polygon, width, height);
        if points.len() < 2 {
            debug!("Segment {} collapsed to a point on screen, skipping", segment.id);
            continue;
        }
        draw_border(&mut canvas, &points);

        let label = if options.label_scores {
            format!("{} {:.2}", segment.id, segment.score)
        } else {
            segment.id.to_string()
        };
        let (cx, cy) = segment.polygon.centroid().to_pixel(width, height);
        draw_label(&mut canvas, &label, cx as i32, cy as i32);
    }

    canvas
}

/// Denormalize a polygon into deduplicated screen points.
fn polygon_pixels(polygon: &Polygon, width: u32, height: u32) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(polygon.len());
    for vertex in polygon.points() {
        let (x, y) = vertex.to_pixel(width, height);
        let candidate = Point::new(x as i32, y as i32);
        if points.last() != Some(&candidate) {
            points.push(candidate);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn parse_hex(color: &str) -> Rgb<u8> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.is_ascii() {
        return Rgb([255, 0, 255]);
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    Rgb([channel(0), channel(2), channel(4)])
}

fn blend_half(canvas: &mut RgbImage, overlay: &RgbImage) {
    for (dst, src) in canvas.pixels_mut().zip(overlay.pixels()) {
        for c in 0..3 {
            dst[c] = ((dst[c] as u16 + src[c] as u16) / 2) as u8;
        }
    }
}

fn draw_border(canvas: &mut RgbImage, points: &[Point<i32>]) {
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            BORDER_COLOR,
        );
    }
}

/// Draw `text` centered at (cx, cy): dark outline pass first, then a light
/// fill pass on top, so labels stay readable on any background.
fn draw_label(canvas: &mut RgbImage, text: &str, cx: i32, cy: i32) {
    let advance = (GLYPH_WIDTH + 1) * GLYPH_SCALE;
    let text_width = text.chars().count() as i32 * advance - GLYPH_SCALE;
    let left = cx - text_width / 2;
    let top = cy - (GLYPH_HEIGHT * GLYPH_SCALE) / 2;

    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx != 0 || dy != 0 {
                draw_text(canvas, text, left + dx, top + dy, LABEL_OUTLINE);
            }
        }
    }
    draw_text(canvas, text, left, top, LABEL_FILL);
}

fn draw_text(canvas: &mut RgbImage, text: &str, left: i32, top: i32, color: Rgb<u8>) {
    let mut x = left;
    for c in text.chars() {
        let rows = glyph_rows(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    let rect = Rect::at(x + col * GLYPH_SCALE, top + row as i32 * GLYPH_SCALE)
                        .of_size(GLYPH_SCALE as u32, GLYPH_SCALE as u32);
                    draw_filled_rect_mut(canvas, rect, color);
                }
            }
        }
        x += (GLYPH_WIDTH + 1) * GLYPH_SCALE;
    }
}

/// 5x7 stencil rows for the characters labels can contain.
fn glyph_rows(c: char) -> [u8; 7] {
    match c {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        _ => [0b00000; 7],
    }
}
