use clap::Parser;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

#[derive(Parser, Clone, Debug)]
#[command(
    name = "image_batch",
    about = "批次將目錄中的影像檔轉換為其他格式",
    long_about = "掃描輸入目錄（不遞迴）中符合副檔名的影像檔，以多執行緒平行轉換為 PNG、JPEG、BMP、GIF 或 TIFF。\n不帶任何參數執行時進入互動模式。轉換過程中按 Ctrl-C 可取消尚未開始的項目。\n使用 `--help` 查看詳細用法。",
    arg_required_else_help = true
)]
pub struct Cli {
    pub input: String,
    /// 輸出目錄，預設為 <輸入目錄>/<格式>_images
    #[arg(short, long)]
    pub output: Option<String>,
    #[arg(short, long, default_value = "png")]
    pub format: String,
    #[arg(long, default_value = "heic")]
    pub input_ext: String,
    #[arg(long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,
    /// 同時轉換的工作執行緒數，預設為 CPU 核心數
    #[arg(short, long)]
    pub jobs: Option<usize>,
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
    #[arg(long, default_value = "info", value_parser = ["debug", "info", "warn", "error"])]
    pub log_level: String,
}

/// 支援的輸出格式（封閉集合）
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Bmp,
        OutputFormat::Gif,
        OutputFormat::Tiff,
    ];

    /// 輸出檔案使用的標準小寫副檔名
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Gif => "gif",
            OutputFormat::Tiff => "tiff",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
            OutputFormat::Gif => image::ImageFormat::Gif,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Bmp => "BMP",
            OutputFormat::Gif => "GIF",
            OutputFormat::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "bmp" => Ok(OutputFormat::Bmp),
            "gif" => Ok(OutputFormat::Gif),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(s.to_string()),
        }
    }
}

pub fn validate_input_path(input: &str) -> io::Result<&Path> {
    let path = Path::new(input);
    if !path.is_dir() {
        log::error!("輸入目錄不存在：{}", input);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("輸入目錄 '{}' 不存在或不是目錄", input)
        ));
    }
    Ok(path)
}

pub fn is_valid_pattern(pattern: &str) -> bool {
    let invalid_chars = ['/', '\\', ':', '?', '"', '<', '>', '|'];
    !pattern.is_empty() && !pattern.contains(&invalid_chars[..])
}

/// 預設輸出目錄：沿用輸入目錄下的 `<格式>_images` 子目錄
pub fn default_output_dir(input: &str, format: &str) -> String {
    let folder = match OutputFormat::from_str(format) {
        Ok(f) => format!("{}_images", f.extension()),
        Err(_) => "converted_images".to_string(),
    };
    Path::new(input).join(folder).to_string_lossy().to_string()
}
