//! QR rendering of customer codes.
//!
//! A customer's QR code carries a deep link (`stampbook://customer/SUN-873-VPV`)
//! that the business app scans instead of having the code read out.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stampbook_core::code::CustomerCode;
//! use stampbook_core::qr::{self, QrConfig};
//!
//! let code = CustomerCode::parse("SUN-873-VPV")?;
//! println!("{}", qr::generate_ascii(&code, &QrConfig::default())?);
//! ```

use base64::Engine;
use qrcode::render::{svg, unicode};
use qrcode::{EcLevel, QrCode};

use crate::code::CustomerCode;
use crate::config::QrSettings;
use crate::error::{Error, Result};

/// Path segment between the scheme and the code.
pub const DEEP_LINK_HOST: &str = "customer";

/// Configuration for QR code generation.
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// URL scheme for deep links (default: "stampbook")
    pub scheme: String,
    /// Error correction level (default: Medium)
    pub error_correction: EcLevel,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            scheme: "stampbook".to_string(),
            error_correction: EcLevel::M,
        }
    }
}

impl From<&QrSettings> for QrConfig {
    fn from(settings: &QrSettings) -> Self {
        Self {
            scheme: settings.scheme.clone(),
            ..Self::default()
        }
    }
}

/// Deep link for a customer code, e.g. `stampbook://customer/SUN-873-VPV`.
#[must_use]
pub fn create_deep_link(code: &CustomerCode, config: &QrConfig) -> String {
    format!("{}://{DEEP_LINK_HOST}/{code}", config.scheme)
}

/// Extract the code from a scanned deep link.
///
/// Accepts any scheme, since scanners may rewrite it; the code itself goes
/// through the usual normalization and validation.
///
/// # Errors
///
/// Returns [`Error::InvalidCodeFormat`] if the link is not a customer link
/// or carries a malformed code.
pub fn parse_deep_link(link: &str) -> Result<CustomerCode> {
    let rest = link
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or_else(|| Error::InvalidCodeFormat(link.to_string()))?;
    let code = rest
        .strip_prefix(DEEP_LINK_HOST)
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(|| Error::InvalidCodeFormat(link.to_string()))?;
    CustomerCode::parse(code.trim_end_matches('/'))
}

fn build(code: &CustomerCode, config: &QrConfig) -> Result<QrCode> {
    let deep_link = create_deep_link(code, config);
    QrCode::with_error_correction_level(&deep_link, config.error_correction)
        .map_err(|e| Error::Internal(format!("Failed to generate QR code: {e}")))
}

/// Render for terminal display using Unicode half blocks.
///
/// # Errors
///
/// Returns an error if QR code generation fails.
pub fn generate_ascii(code: &CustomerCode, config: &QrConfig) -> Result<String> {
    let rendered = build(code, config)?
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();

    Ok(rendered)
}

/// Render as an SVG document.
///
/// # Errors
///
/// Returns an error if QR code generation fails.
pub fn generate_svg(code: &CustomerCode, config: &QrConfig) -> Result<String> {
    let svg_string = build(code, config)?
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    Ok(svg_string)
}

/// Render as a base64-encoded PNG of `size` x `size` pixels.
///
/// # Errors
///
/// Returns an error if QR code generation or encoding fails.
pub fn generate_png_base64(code: &CustomerCode, config: &QrConfig, size: u32) -> Result<String> {
    use image::Luma;

    let image = build(code, config)?.render::<Luma<u8>>().build();
    let scaled = image::imageops::resize(&image, size, size, image::imageops::FilterType::Nearest);

    let mut png_bytes = Vec::new();
    {
        use image::ImageEncoder;
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&scaled, size, size, image::ExtendedColorType::L8)
            .map_err(|e| Error::Internal(format!("Failed to encode PNG: {e}")))?;
    }

    Ok(base64::prelude::BASE64_STANDARD.encode(&png_bytes))
}
