use dialoguer::{Confirm, Input, Select};
use std::io;
use std::path::Path;

use crate::action::cli::{execute_job, CancelTrigger};
use crate::config::config::{default_output_dir, is_valid_pattern, OutputFormat};
use crate::config::ports::{AppConfig, ConfigPort};
use crate::service::config_service::{ConfigService, DefaultConfigAdapter};
use crate::utils::utils::setup_logging;

pub fn process_interactive_mode() -> io::Result<String> {
    println!("=== 歡迎使用互動模式 ===");
    setup_logging(&get_log_level_option()?)?;
    let use_default_config = get_default_config_option()?;
    let input = get_input_path()?;

    let config_port: Box<dyn ConfigPort> = if use_default_config {
        println!("使用預設配置：HEIC 轉 PNG，輸出至 {}", default_output_dir(&input, "png"));
        Box::new(DefaultConfigAdapter::new(input, None))
    } else {
        Box::new(InteractiveConfigAdapter::new(input))
    };

    let config_service = ConfigService::new(config_port);
    let (config, job) = config_service.job_config()?;
    execute_job(job, config.no_progress, CancelTrigger::EnterKey)?;
    Ok(config.output)
}

pub fn get_default_config_option() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("是否使用預設配置？（HEIC 轉 PNG，輸出到輸入目錄下的 png_images）")
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("預設配置選擇失敗: {}", e)))
}

pub fn get_input_path() -> io::Result<String> {
    Input::new()
        .with_prompt("請輸入影像所在目錄（例如：./photos）")
        .validate_with(|input: &String| -> Result<(), String> {
            if Path::new(input).is_dir() { Ok(()) } else { Err(format!("目錄 '{}' 不存在", input)) }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_output_format() -> io::Result<OutputFormat> {
    let items: Vec<String> = OutputFormat::ALL.iter()
        .map(|f| format!("{}（.{}）", f, f.extension()))
        .collect();
    let index = Select::new()
        .with_prompt("選擇輸出格式（使用方向鍵選擇，按 Enter 確認）")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("輸出格式選擇失敗: {}", e)))?;
    Ok(OutputFormat::ALL[index])
}

pub fn get_output_path(input: &str, format: OutputFormat) -> io::Result<String> {
    Input::new()
        .with_prompt("輸入輸出目錄")
        .default(default_output_dir(input, format.extension()))
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_input_extension() -> io::Result<String> {
    Input::new()
        .with_prompt("輸入要轉換的副檔名（預設為 heic）")
        .default("heic".to_string())
        .validate_with(|ext: &String| -> Result<(), String> {
            if is_valid_pattern(ext.trim_start_matches('.')) { Ok(()) } else { Err(format!("無效的副檔名: {}", ext)) }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("副檔名輸入失敗: {}", e)))
}

pub fn get_exclude_patterns() -> io::Result<Option<Vec<String>>> {
    let exclude = Input::new()
        .with_prompt("輸入排除模式（例如：*_thumb*，預設為空）")
        .default("".to_string())
        .allow_empty(true)
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("排除模式輸入失敗: {}", e)))?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<String>>();

    Ok(if exclude.is_empty() { None } else { Some(exclude) })
}

pub fn get_no_progress_option() -> io::Result<bool> {
    Ok(false)
}

pub fn get_log_level_option() -> io::Result<String> {
    Ok("info".to_string())
}

// 交互配置適配器
pub struct InteractiveConfigAdapter {
    input: String,
}

impl InteractiveConfigAdapter {
    pub fn new(input: String) -> Self {
        InteractiveConfigAdapter { input }
    }
}

impl ConfigPort for InteractiveConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        let format = get_output_format()?;
        let output = get_output_path(&self.input, format)?;
        let input_ext = get_input_extension()?;
        let exclude = get_exclude_patterns()?;
        let no_progress = get_no_progress_option()?;

        Ok(AppConfig {
            input: self.input.clone(),
            output,
            format: format.extension().to_string(),
            input_ext,
            exclude,
            jobs: None,
            no_progress,
        })
    }
}
