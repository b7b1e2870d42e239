//! Barcode decoding from uploaded images
//!
//! Images arrive as base64 (optionally a `data:` URI). Decoding is CPU bound and
//! synchronous; callers run it on the blocking pool.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{GrayImage, ImageError};
use rxing::{BarcodeFormat, DecodingHintDictionary};
use thiserror::Error;
use tracing::debug;

/// Scan error
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl From<ImageError> for ScanError {
    fn from(err: ImageError) -> Self {
        ScanError::InvalidImage(err.to_string())
    }
}

/// A barcode found in an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    /// Decoded payload, trimmed
    pub text: String,
    /// Short symbology name (`EAN13`, `UPCA`, `QRCODE`, ...)
    pub symbology: String,
}

/// Image-to-barcode capability
pub trait BarcodeDecoder: Send + Sync {
    /// Decode the first barcode in an encoded image (PNG, JPEG, ...).
    ///
    /// `Ok(None)` means the image was readable but holds no barcode.
    fn decode(&self, image_bytes: &[u8]) -> Result<Option<DecodedBarcode>, ScanError>;
}

/// Decoder backed by `rxing`.
///
/// Tries the plain grayscale image first, then a contrast-boosted copy, then a
/// binarized copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RxingDecoder;

/// Contrast boost applied on the second pass
const CONTRAST_BOOST: f32 = 40.0;

/// Luma cut-off for the binarized pass
const BINARY_THRESHOLD: u8 = 127;

impl BarcodeDecoder for RxingDecoder {
    fn decode(&self, image_bytes: &[u8]) -> Result<Option<DecodedBarcode>, ScanError> {
        let gray = image::load_from_memory(image_bytes)?.to_luma8();

        let passes: [(&str, fn(&GrayImage) -> GrayImage); 3] = [
            ("grayscale", |g| g.clone()),
            ("contrast", |g| image::imageops::contrast(g, CONTRAST_BOOST)),
            ("binary", binarize),
        ];

        for (pass, prepare) in passes {
            let prepared = prepare(&gray);
            if let Some(found) = detect(prepared) {
                debug!(pass, symbology = %found.symbology, "Barcode detected");
                return Ok(Some(found));
            }
        }

        debug!(
            width = gray.width(),
            height = gray.height(),
            "No barcode detected in image"
        );
        Ok(None)
    }
}

fn binarize(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > BINARY_THRESHOLD { 255 } else { 0 };
    }
    out
}

fn detect(gray: GrayImage) -> Option<DecodedBarcode> {
    let (width, height) = gray.dimensions();
    // `detect_in_luma` swaps width and height; the hinted variant keeps them in order
    let mut hints = DecodingHintDictionary::new();
    let result =
        rxing::helpers::detect_in_luma_with_hints(gray.into_raw(), width, height, None, &mut hints)
            .ok()?;

    let text = result.getText().trim().to_string();
    if text.is_empty() {
        return None;
    }
    Some(DecodedBarcode {
        text,
        symbology: symbology_name(result.getBarcodeFormat()),
    })
}

/// Short symbology name as clients expect it
pub fn symbology_name(format: &BarcodeFormat) -> String {
    let name = match format {
        BarcodeFormat::EAN_13 => "EAN13",
        BarcodeFormat::EAN_8 => "EAN8",
        BarcodeFormat::UPC_A => "UPCA",
        BarcodeFormat::UPC_E => "UPCE",
        BarcodeFormat::CODE_128 => "CODE128",
        BarcodeFormat::CODE_39 => "CODE39",
        BarcodeFormat::CODE_93 => "CODE93",
        BarcodeFormat::ITF => "I25",
        BarcodeFormat::CODABAR => "CODABAR",
        BarcodeFormat::QR_CODE => "QRCODE",
        BarcodeFormat::DATA_MATRIX => "DATAMATRIX",
        BarcodeFormat::PDF_417 => "PDF417",
        other => return format!("{:?}", other).replace('_', ""),
    };
    name.to_string()
}

/// Decode an uploaded image payload: a `data:` URI or bare base64
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, ScanError> {
    let encoded = match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    };
    let encoded: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

    STANDARD
        .decode(encoded)
        .map_err(|e| ScanError::InvalidBase64(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Luma};
    use rxing::Writer;
    use std::io::Cursor;

    fn png_bytes(img: GrayImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Render an EAN-13 barcode with a white quiet zone, `scale` px per module
    fn ean13_png(code: &str, scale: u32) -> Vec<u8> {
        let matrix = rxing::MultiFormatWriter::default()
            .encode(code, &BarcodeFormat::EAN_13, 0, 0)
            .unwrap();
        let margin = 30;
        let bar_height = 120;
        let width = matrix.getWidth() * scale + 2 * margin;
        let height = bar_height + 2 * margin;

        let img = GrayImage::from_fn(width, height, |x, y| {
            let inside = x >= margin
                && x < width - margin
                && y >= margin
                && y < height - margin;
            if inside && matrix.get((x - margin) / scale, 0) {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        png_bytes(img)
    }

    #[test]
    fn test_decodes_ean13() {
        let bytes = ean13_png("5449000000996", 3);
        let found = RxingDecoder.decode(&bytes).unwrap().unwrap();
        assert_eq!(found.text, "5449000000996");
        assert_eq!(found.symbology, "EAN13");
    }

    #[test]
    fn test_decodes_wide_images_at_several_scales() {
        for scale in [2, 3, 4] {
            let bytes = ean13_png("5449000000996", scale);
            let img = image::load_from_memory(&bytes).unwrap();
            assert!(img.width() > img.height());

            let found = RxingDecoder.decode(&bytes).unwrap();
            assert_eq!(
                found.map(|b| b.text).as_deref(),
                Some("5449000000996"),
                "scale {}",
                scale
            );
        }
    }

    #[test]
    fn test_blank_image_has_no_barcode() {
        let bytes = png_bytes(GrayImage::from_pixel(200, 100, Luma([255])));
        assert_eq!(RxingDecoder.decode(&bytes).unwrap(), None);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = RxingDecoder.decode(b"definitely not an image");
        assert!(matches!(result, Err(ScanError::InvalidImage(_))));
    }

    #[test]
    fn test_payload_with_data_uri() {
        let bytes = decode_image_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert_eq!(decode_image_payload("aGVs\nbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_payload_not_base64() {
        assert!(matches!(
            decode_image_payload("data:image/png;base64,@@@"),
            Err(ScanError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_symbology_names() {
        assert_eq!(symbology_name(&BarcodeFormat::UPC_A), "UPCA");
        assert_eq!(symbology_name(&BarcodeFormat::QR_CODE), "QRCODE");
        assert_eq!(symbology_name(&BarcodeFormat::CODE_128), "CODE128");
    }
}
