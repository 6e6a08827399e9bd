use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use std::io::Cursor;

pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Decodes uploaded bytes, sniffing the format from the content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        anyhow::bail!("Uploaded image is empty");
    }
    image::load_from_memory(bytes).context("Failed to decode uploaded image")
}

/// Drops any alpha channel and encodes as JPEG at `quality` (1-100).
pub fn to_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

    let mut jpeg_bytes = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg_bytes), ImageOutputFormat::Jpeg(quality))
        .context("Failed to encode image as JPEG")?;

    Ok(jpeg_bytes)
}

pub fn to_data_url(jpeg_bytes: &[u8]) -> String {
    format!("{}{}", JPEG_DATA_URL_PREFIX, general_purpose::STANDARD.encode(jpeg_bytes))
}

/// Turns an arbitrary uploaded image into a JPEG data URL for the model.
pub fn normalize_for_transport(bytes: &[u8], quality: u8) -> Result<String> {
    let image = decode(bytes)?;
    log::debug!(
        "🖼️ Decoded upload: {}x{} {:?} ({} bytes)",
        image.width(),
        image.height(),
        image.color(),
        bytes.len()
    );

    let jpeg_bytes = to_jpeg(&image, quality)?;
    let data_url = to_data_url(&jpeg_bytes);
    log::debug!(
        "🔄 Transport image: {} JPEG bytes, {} data URL chars",
        jpeg_bytes.len(),
        data_url.len()
    );

    Ok(data_url)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ColorType, ImageFormat, Rgba, RgbaImage};

    pub(crate) fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    fn decode_data_url(data_url: &str) -> DynamicImage {
        let payload = data_url.strip_prefix(JPEG_DATA_URL_PREFIX).unwrap();
        let jpeg = general_purpose::STANDARD.decode(payload).unwrap();
        image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn test_rgba_png_becomes_rgb_jpeg() {
        let png = png_bytes(500, 500, [200, 40, 40, 128]);

        let data_url = normalize_for_transport(&png, 80).unwrap();
        assert!(data_url.starts_with("data:image/jpeg;base64,"));

        let decoded = decode_data_url(&data_url);
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (500, 500));
    }

    #[test]
    fn test_jpeg_input_stays_jpeg() {
        let png = png_bytes(32, 16, [10, 200, 10, 255]);
        let jpeg = to_jpeg(&decode(&png).unwrap(), 90).unwrap();

        let data_url = normalize_for_transport(&jpeg, 80).unwrap();
        assert!(data_url.starts_with(JPEG_DATA_URL_PREFIX));
        assert_eq!(decode_data_url(&data_url).width(), 32);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        // Noisy content so quality actually matters
        let img = RgbaImage::from_fn(128, 128, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8, 255])
        });
        let img = DynamicImage::ImageRgba8(img);

        let low = to_jpeg(&img, 10).unwrap();
        let high = to_jpeg(&img, 95).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let err = normalize_for_transport(&[], 80).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = normalize_for_transport(b"definitely not an image", 80).unwrap_err();
        assert!(format!("{:#}", err).starts_with("Failed to decode uploaded image"));
    }

    #[test]
    fn test_truncated_png_rejected() {
        let png = png_bytes(64, 64, [1, 2, 3, 255]);
        // Signature and IHDR survive, pixel data does not
        assert!(normalize_for_transport(&png[..40], 80).is_err());
    }
}
