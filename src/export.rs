use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{ColorImage, Rect};
use image::RgbaImage;

// ---------------------------------------------------------------------------
// Plot snapshot export
// ---------------------------------------------------------------------------

/// Copy the pixels of `rect` (in points) out of a viewport screenshot.
/// With no rect the whole screenshot is kept.
pub fn crop_screenshot(image: &ColorImage, rect: Option<Rect>, pixels_per_point: f32) -> RgbaImage {
    let full_w = image.width();
    let full_h = image.height();

    let (x0, y0, x1, y1) = match rect {
        Some(rect) => (
            ((rect.left() * pixels_per_point).max(0.0) as usize).min(full_w),
            ((rect.top() * pixels_per_point).max(0.0) as usize).min(full_h),
            ((rect.right() * pixels_per_point).ceil().max(0.0) as usize).min(full_w),
            ((rect.bottom() * pixels_per_point).ceil().max(0.0) as usize).min(full_h),
        ),
        None => (0, 0, full_w, full_h),
    };

    let width = x1.saturating_sub(x0);
    let height = y1.saturating_sub(y0);

    RgbaImage::from_fn(width as u32, height as u32, |col, row| {
        let c = image.pixels[(y0 + row as usize) * full_w + x0 + col as usize];
        image::Rgba([c.r(), c.g(), c.b(), c.a()])
    })
}

/// Write a snapshot as PNG.  Core view state is never touched.
pub fn save_png(snapshot: &RgbaImage, path: &Path) -> Result<()> {
    snapshot
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved plot snapshot to {}", path.display());
    Ok(())
}
