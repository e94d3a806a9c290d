use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, RgbImage};

use crate::error::AppError;

/// 解码上传的图片字节（格式由内容嗅探，不看扩展名）
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AppError> {
    image::load_from_memory(bytes).map_err(|e| AppError::ImageDecode(e.to_string()))
}

/// 编码为 JPEG。透明通道直接丢弃（JPEG 不支持 alpha）。
pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, AppError> {
    let mut out = Vec::new();
    let mut enc = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    enc.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8.into())
        .map_err(|e| AppError::Internal(format!("JPEG encode error: {e}")))?;
    Ok(out)
}

/// 解码任意受支持格式并重新编码为 JPEG
pub fn reencode_as_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, AppError> {
    let img = decode_image(bytes)?;
    encode_jpeg(&img.to_rgb8(), quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn png_with_alpha_reencodes_to_jpeg() {
        let img = RgbaImage::from_pixel(12, 8, Rgba([200, 10, 10, 128]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("encode png");

        let jpeg = reencode_as_jpeg(&png, 90).expect("reencode");
        assert_eq!(image::guess_format(&jpeg).ok(), Some(ImageFormat::Jpeg));
        let back = decode_image(&jpeg).expect("decode jpeg");
        assert_eq!((back.width(), back.height()), (12, 8));
    }

    #[test]
    fn non_image_bytes_are_a_decode_error() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AppError::ImageDecode(_)));
    }
}
