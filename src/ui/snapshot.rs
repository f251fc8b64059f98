use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{vec2, ColorImage, Pos2, Rect};

/// `chart-<unix millis>.png`
pub fn default_chart_name(unix_millis: i64) -> String {
    format!("chart-{unix_millis}.png")
}

/// Cut `region` (in points) out of a full-window screenshot.
///
/// The region is clipped to the image; a region entirely outside it yields
/// the whole screenshot.
pub fn crop(screenshot: &ColorImage, region: Option<Rect>, pixels_per_point: f32) -> ColorImage {
    let [w, h] = screenshot.size;
    let bounds = Rect::from_min_size(
        Pos2::ZERO,
        vec2(w as f32 / pixels_per_point, h as f32 / pixels_per_point),
    );
    match region.map(|r| r.intersect(bounds)) {
        Some(rect) if rect.is_positive() => screenshot.region(&rect, Some(pixels_per_point)),
        _ => screenshot.clone(),
    }
}

/// Encode `image` as PNG at `path`.
pub fn save_png(path: &Path, image: &ColorImage) -> Result<()> {
    let [w, h] = image.size;
    let bytes: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|c| c.to_srgba_unmultiplied())
        .collect();
    let buffer = image::RgbaImage::from_raw(w as u32, h as u32, bytes)
        .context("screenshot buffer does not match its size")?;
    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
