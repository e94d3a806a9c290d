use std::path::Path;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use super::{StylizeError, Stylizer};

/// 内置滤镜集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Grayscale,
    Sepia,
    Invert,
    Blur,
    Sharpen,
    Mosaic,
    Posterize,
    Brighten,
    Contrast,
    Hue,
}

impl Filter {
    pub const ALL: [Filter; 10] = [
        Filter::Grayscale,
        Filter::Sepia,
        Filter::Invert,
        Filter::Blur,
        Filter::Sharpen,
        Filter::Mosaic,
        Filter::Posterize,
        Filter::Brighten,
        Filter::Contrast,
        Filter::Hue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
            Filter::Invert => "invert",
            Filter::Blur => "blur",
            Filter::Sharpen => "sharpen",
            Filter::Mosaic => "mosaic",
            Filter::Posterize => "posterize",
            Filter::Brighten => "brighten",
            Filter::Contrast => "contrast",
            Filter::Hue => "hue",
        }
    }

    /// 对 RGB 图像应用滤镜，输出尺寸与输入一致
    pub fn apply(self, img: &RgbImage) -> RgbImage {
        match self {
            Filter::Grayscale => DynamicImage::ImageLuma8(imageops::grayscale(img)).to_rgb8(),
            Filter::Sepia => sepia(img),
            Filter::Invert => {
                let mut out = img.clone();
                imageops::invert(&mut out);
                out
            }
            Filter::Blur => imageops::blur(img, 3.0),
            Filter::Sharpen => imageops::unsharpen(img, 2.0, 4),
            Filter::Mosaic => mosaic(img, 32),
            Filter::Posterize => posterize(img, 4),
            Filter::Brighten => imageops::brighten(img, 40),
            Filter::Contrast => imageops::contrast(img, 30.0),
            Filter::Hue => imageops::huerotate(img, 180),
        }
    }
}

impl FromStr for Filter {
    type Err = StylizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| StylizeError::UnknownFilter(s.to_string()))
    }
}

fn sepia(img: &RgbImage) -> RgbImage {
    let mut out = img.clone();
    for Rgb([r, g, b]) in out.pixels_mut() {
        let (fr, fg, fb) = (f32::from(*r), f32::from(*g), f32::from(*b));
        let tone = |cr: f32, cg: f32, cb: f32| (fr * cr + fg * cg + fb * cb).min(255.0) as u8;
        let (nr, ng, nb) = (
            tone(0.393, 0.769, 0.189),
            tone(0.349, 0.686, 0.168),
            tone(0.272, 0.534, 0.131),
        );
        (*r, *g, *b) = (nr, ng, nb);
    }
    out
}

/// 像素化：短边约分成 `cells` 个色块
fn mosaic(img: &RgbImage, cells: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let block = (w.min(h) / cells.max(1)).max(1);
    if block == 1 {
        return img.clone();
    }
    let small = imageops::resize(
        img,
        w.div_ceil(block),
        h.div_ceil(block),
        FilterType::Triangle,
    );
    imageops::resize(&small, w, h, FilterType::Nearest)
}

fn posterize(img: &RgbImage, levels: u8) -> RgbImage {
    let step = 255.0 / f32::from(levels.max(2) - 1);
    let mut out = img.clone();
    for px in out.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = ((f32::from(*c) / step).round() * step).min(255.0) as u8;
        }
    }
    out
}

/// 默认风格化例程：读取原图后按名称应用内置滤镜
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinStylizer;

impl BuiltinStylizer {
    pub fn filter_names() -> impl Iterator<Item = &'static str> {
        Filter::ALL.into_iter().map(Filter::name)
    }
}

impl Stylizer for BuiltinStylizer {
    fn stylize(&self, original: &Path, filter: &str) -> Result<RgbImage, StylizeError> {
        // 先解析滤镜名，未知滤镜无需读盘
        let filter: Filter = filter.parse()?;
        let img = image::open(original).map_err(|e| StylizeError::Source {
            path: original.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(filter.apply(&img.to_rgb8()))
    }
}
