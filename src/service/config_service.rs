use std::io;

use crate::config::config::default_output_dir;
use crate::config::ports::{AppConfig, ConfigPort};
use crate::models::job::JobConfig;

// 配置服務，負責從適配器取得配置並轉成工作配置
pub struct ConfigService {
    config_port: Box<dyn ConfigPort>,
}

impl ConfigService {
    pub fn new(config_port: Box<dyn ConfigPort>) -> Self {
        ConfigService { config_port }
    }

    pub fn get_config(&self) -> io::Result<AppConfig> {
        self.config_port.get_config()
    }

    pub fn job_config(&self) -> io::Result<(AppConfig, JobConfig)> {
        let config = self.get_config()?;
        let job = to_job_config(&config);
        Ok((config, job))
    }
}

pub fn to_job_config(config: &AppConfig) -> JobConfig {
    let mut job = JobConfig::new(&config.input, &config.output, config.format.clone())
        .with_input_extension(config.input_ext.clone())
        .with_exclude(config.exclude.clone().unwrap_or_default());
    job.parallelism = config.jobs;
    job
}

// 預設配置適配器：HEIC 轉 PNG，輸出到輸入目錄下的 png_images
pub struct DefaultConfigAdapter {
    input: String,
    output: Option<String>,
}

impl DefaultConfigAdapter {
    pub fn new(input: String, output: Option<String>) -> Self {
        DefaultConfigAdapter { input, output }
    }
}

impl ConfigPort for DefaultConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        let format = "png".to_string();
        Ok(AppConfig {
            input: self.input.clone(),
            output: self.output.clone().unwrap_or_else(|| default_output_dir(&self.input, &format)),
            format,
            input_ext: "heic".to_string(),
            exclude: None,
            jobs: None,
            no_progress: false,
        })
    }
}
