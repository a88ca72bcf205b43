//! Loading frames and templates via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::frame::{luma_u8, Frame, PixelFormat};
use crate::template::{Template, TemplateId};
use crate::util::{GridMatchError, GridMatchResult};
use std::path::Path;

fn open(path: &Path) -> GridMatchResult<image::RgbaImage> {
    let img = image::open(path).map_err(|err| GridMatchError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    })?;
    Ok(img.to_rgba8())
}

/// Loads an image from disk as an RGBA frame.
pub fn load_frame<P: AsRef<Path>>(path: P) -> GridMatchResult<Frame> {
    let rgba = open(path.as_ref())?;
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    Frame::new(rgba.into_raw(), width, height, PixelFormat::Rgba8)
}

/// Converts an RGBA image to intensity plus an alpha-derived mask.
///
/// Pixels with zero alpha are excluded from scoring. When every pixel is
/// opaque the mask is omitted.
pub fn template_from_rgba(id: TemplateId, rgba: &image::RgbaImage) -> GridMatchResult<Template> {
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    let mut gray = Vec::with_capacity(width * height);
    let mut mask = Vec::with_capacity(width * height);
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        gray.push(luma_u8(r, g, b));
        mask.push(u8::from(a > 0));
    }

    let tpl = Template::new(id, gray, width, height)?;
    if mask.iter().all(|&m| m == 1) {
        Ok(tpl)
    } else {
        tpl.with_mask(mask)
    }
}

/// Loads a template image from disk; see [`template_from_rgba`].
pub fn load_template<P: AsRef<Path>>(id: TemplateId, path: P) -> GridMatchResult<Template> {
    let path = path.as_ref();
    let rgba = open(path)?;
    let tpl = template_from_rgba(id, &rgba)?;
    Ok(match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => tpl.with_name(name),
        None => tpl,
    })
}
