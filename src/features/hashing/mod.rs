use std::fmt;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};

/// 哈希边长（8x8 = 64 bit）
const HASH_SIZE: u32 = 8;

/// 图片的平均哈希（aHash），作为照片在文件系统中的键。
///
/// 计算方式：灰度化（Rec.601 权重）→ 缩放到 8x8 → 求 64 个像素的均值 →
/// 逐行扫描，像素严格大于均值记 1，第一个像素为最高位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AverageHash(u64);

impl AverageHash {
    pub fn of(img: &DynamicImage) -> Self {
        let small = imageops::resize(&luma_601(img), HASH_SIZE, HASH_SIZE, FilterType::Lanczos3);
        let total: u32 = small.pixels().map(|p| u32::from(p.0[0])).sum();
        let mean = f64::from(total) / f64::from(HASH_SIZE * HASH_SIZE);

        let bits = small
            .pixels()
            .fold(0u64, |acc, p| (acc << 1) | u64::from(f64::from(p.0[0]) > mean));
        Self(bits)
    }
}

/// `L = (299 R + 587 G + 114 B) / 1000`，四舍五入。
///
/// `DynamicImage::to_luma8` 使用 Rec.709 权重，与常见 aHash 实现得到的哈希不一致。
fn luma_601(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000;
        Luma([l as u8])
    })
}

/// 16 位小写十六进制，左侧补零
impl fmt::Display for AverageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{AverageHash, luma_601};
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

    fn half_split(size: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, _| {
            if x < size / 2 { Luma([255]) } else { Luma([0]) }
        }))
    }

    #[test]
    fn uniform_image_hashes_to_zero() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, image::Rgb([90, 90, 90])));
        let hash = AverageHash::of(&img);
        assert_eq!(hash, AverageHash(0));
        assert_eq!(hash.to_string(), "0000000000000000");
    }

    #[test]
    fn grayscale_uses_rec601_weights() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        }));
        let gray = luma_601(&img);
        assert_eq!(gray.get_pixel(0, 0), &Luma([76]));
        assert_eq!(gray.get_pixel(1, 0), &Luma([150]));
        assert_eq!(gray.get_pixel(2, 0), &Luma([29]));
    }

    #[test]
    fn left_bright_half_sets_high_nibbles() {
        let hash = AverageHash::of(&half_split(64));
        assert_eq!(hash.to_string(), "f0f0f0f0f0f0f0f0");
    }

    #[test]
    fn hash_is_scale_invariant_for_simple_shapes() {
        assert_eq!(AverageHash::of(&half_split(64)), AverageHash::of(&half_split(256)));
    }

    #[test]
    fn display_is_fixed_width_lowercase_hex() {
        let s = AverageHash(0xAB).to_string();
        assert_eq!(s, "00000000000000ab");
        assert_eq!(s.len(), 16);
    }
}
