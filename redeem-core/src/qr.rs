//! QR rendering and logo composition
//!
//! Symbols are rendered at error-correction level H so the centered logo
//! overlay can obscure part of the symbol and leave it decodable.

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, Rgba, RgbaImage};
use qrcode::QrCode;
use tracing::debug;

pub use qrcode::EcLevel;

use crate::{Code, RedeemError, Result};

/// Dark module color, #435258.
pub const DARK_MODULE: Rgba<u8> = Rgba([0x43, 0x52, 0x58, 0xff]);

const LIGHT_MODULE: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Rendering style for QR artifacts.
#[derive(Debug, Clone)]
pub struct QrStyle {
    /// Edge length of one module in pixels.
    pub module_px: u32,
    /// Error-correction level. Lowering this below H risks unreadable
    /// symbols under the logo overlay.
    pub ec_level: EcLevel,
    /// Dark module color.
    pub dark: Rgba<u8>,
    /// Logo width as a fraction of the QR width.
    pub logo_ratio: f32,
    /// Treat a missing logo file as soft degradation instead of an error.
    pub logo_optional: bool,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            module_px: 10,
            ec_level: EcLevel::H,
            dark: DARK_MODULE,
            logo_ratio: 0.19,
            logo_optional: true,
        }
    }
}

/// Render the QR symbol for a payload URL, overlaying the logo when given.
///
/// The quiet zone is the standard four modules. A missing logo file is
/// soft degradation (plain QR) under `logo_optional`, an error otherwise.
pub fn render(url: &str, style: &QrStyle, logo: Option<&Path>) -> Result<RgbaImage> {
    let symbol = QrCode::with_error_correction_level(url.as_bytes(), style.ec_level)?;
    let mut img: RgbaImage = symbol
        .render::<Rgba<u8>>()
        .module_dimensions(style.module_px, style.module_px)
        .dark_color(style.dark)
        .light_color(LIGHT_MODULE)
        .build();

    if let Some(path) = logo {
        if path.is_file() {
            overlay_logo(&mut img, path, style.logo_ratio)?;
        } else if style.logo_optional {
            debug!(logo = %path.display(), "logo file missing, rendering plain QR");
        } else {
            return Err(RedeemError::LogoMissing(path.to_path_buf()));
        }
    }
    Ok(img)
}

/// Scale the logo to `ratio` of the QR width (aspect preserved, Lanczos3)
/// and alpha-paste it centered.
fn overlay_logo(qr: &mut RgbaImage, path: &Path, ratio: f32) -> Result<()> {
    let logo = image::open(path)?;
    let target = (qr.width() as f32 * ratio) as u32;
    let scaled = logo.resize(target, target, imageops::FilterType::Lanczos3);

    let x = (qr.width() - scaled.width()) / 2;
    let y = (qr.height() - scaled.height()) / 2;
    imageops::overlay(qr, &scaled.to_rgba8(), x as i64, y as i64);
    Ok(())
}

/// Write the artifact as `<CODE>.png`, overwriting any previous render.
pub fn save_png(img: &RgbaImage, dir: &Path, code: &Code) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{code}.png"));
    img.save(&path)?;
    Ok(path)
}
