use std::fs;
use std::path::Path;

use image::{DynamicImage, ImageError};
use log::debug;

use crate::config::config::OutputFormat;
use crate::models::job::{ConversionResult, WorkItem};
use crate::service::traits::i_service::ImageCodecTrait;

const HEIF_EXTENSIONS: [&str; 4] = ["heic", "heif", "heics", "heifs"];

/// 以 `image` crate 實作的轉換服務；HEIC/HEIF 需要 `heif` 功能
pub struct ImageCodecService;

impl ImageCodecService {
    pub fn new() -> Self {
        ImageCodecService
    }
}

impl Default for ImageCodecService {
    fn default() -> Self {
        Self::new()
    }
}

fn is_heif(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| HEIF_EXTENSIONS.contains(&e.as_str()))
}

fn decode(path: &Path) -> Result<DynamicImage, String> {
    if is_heif(path) {
        return decode_heif(path);
    }
    image::open(path).map_err(|e| describe_image_error(&e))
}

#[cfg(feature = "heif")]
fn decode_heif(path: &Path) -> Result<DynamicImage, String> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let path_str = path.to_str().ok_or_else(|| "路徑不是有效的 UTF-8".to_string())?;
    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_file(path_str).map_err(|e| format!("無法讀取 HEIF：{}", e))?;
    let handle = ctx.primary_image_handle().map_err(|e| format!("無法取得主影像：{}", e))?;
    let heif_image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(|e| format!("HEIF 解碼失敗：{}", e))?;

    let planes = heif_image.planes();
    let plane = planes.interleaved.ok_or_else(|| "HEIF 影像缺少交錯平面".to_string())?;
    let (width, height) = (plane.width, plane.height);
    let buffer = pack_rgba_rows(plane.data, width, height, plane.stride)?;
    image::RgbaImage::from_raw(width, height, buffer)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| "HEIF 像素資料長度不符".to_string())
}

/// 去除每列的 stride 填充，取得緊密排列的 RGBA 資料
#[cfg(any(feature = "heif", test))]
fn pack_rgba_rows(data: &[u8], width: u32, height: u32, stride: usize) -> Result<Vec<u8>, String> {
    let row_len = width as usize * 4;
    let height = height as usize;
    let needed = match height {
        0 => 0,
        h => stride * (h - 1) + row_len,
    };
    if stride < row_len || data.len() < needed {
        return Err("HEIF 像素資料長度不符".to_string());
    }
    let mut buffer = Vec::with_capacity(row_len * height);
    for y in 0..height {
        let start = y * stride;
        buffer.extend_from_slice(&data[start..start + row_len]);
    }
    Ok(buffer)
}

#[cfg(not(feature = "heif"))]
fn decode_heif(path: &Path) -> Result<DynamicImage, String> {
    Err(format!(
        "{} 為 HEIC/HEIF 檔案，但此版本未啟用 HEIF 解碼（請以 --features heif 編譯）",
        path.display()
    ))
}

fn describe_image_error(err: &ImageError) -> String {
    match err {
        ImageError::Decoding(e) => format!("解碼失敗：{}", e),
        ImageError::Encoding(e) => format!("編碼失敗：{}", e),
        ImageError::Unsupported(e) => format!("不支援的影像：{}", e),
        ImageError::IoError(e) => format!("讀寫錯誤：{}", e),
        other => other.to_string(),
    }
}

/// 依目標格式調整像素排列：JPEG 不支援 alpha，GIF 與 BMP 以 8 位元儲存
fn prepare_for(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        OutputFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
        OutputFormat::Bmp => {
            if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            }
        }
        OutputFormat::Png | OutputFormat::Tiff => img,
    }
}

impl ImageCodecTrait for ImageCodecService {
    fn convert(&self, item: &WorkItem) -> ConversionResult {
        let img = match decode(&item.input_path) {
            Ok(img) => img,
            Err(msg) => return ConversionResult::failed(item.clone(), msg),
        };
        debug!(
            "已解碼 {}（{}x{}），輸出為 {}",
            item.input_path.display(),
            img.width(),
            img.height(),
            item.format
        );

        let img = prepare_for(img, item.format);
        if let Err(e) = img.save_with_format(&item.output_path, item.format.image_format()) {
            // 不留下寫到一半的檔案
            let _ = fs::remove_file(&item.output_path);
            return ConversionResult::failed(item.clone(), describe_image_error(&e));
        }
        ConversionResult::succeeded(item.clone())
    }
}
