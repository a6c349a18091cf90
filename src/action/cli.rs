use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use clap::Parser;

use crate::action::interactive::process_interactive_mode;
use crate::config::config::{default_output_dir, is_valid_pattern, validate_input_path, Cli};
use crate::config::ports::{AppConfig, ConfigPort};
use crate::facade::job_engine::{JobEngine, JobStart};
use crate::facade::traits::i_job::JobEngineTrait;
use crate::models::job::{CancelToken, JobConfig, JobSummary};
use crate::service::config_service::ConfigService;
use crate::utils::utils::{setup_logging, summary_lines, ConsoleProgressSink};

/// 使用者取消工作的方式
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CancelTrigger {
    CtrlC,
    EnterKey,
}

pub fn process_args(args: Vec<String>) -> io::Result<String> {
    if args.len() == 1 {
        process_interactive_mode()
    } else {
        process_cli_mode()
    }
}

pub fn process_cli_mode() -> io::Result<String> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level)?;

    let config_service = ConfigService::new(Box::new(CliConfigAdapter::new(cli)));
    let (config, job) = config_service.job_config()?;
    execute_job(job, config.no_progress, CancelTrigger::CtrlC)?;
    Ok(config.output)
}

/// 讀到一行輸入才算按下 Enter；EOF 或讀取錯誤不算
fn enter_pressed<R: BufRead>(mut reader: R) -> bool {
    let mut line = String::new();
    matches!(reader.read_line(&mut line), Ok(n) if n > 0)
}

fn install_cancel_trigger(trigger: CancelTrigger, token: CancelToken) {
    match trigger {
        CancelTrigger::CtrlC => {
            if let Err(e) = ctrlc::set_handler(move || token.cancel()) {
                log::warn!("無法註冊 Ctrl-C 處理程序，取消功能停用：{}", e);
            }
        }
        CancelTrigger::EnterKey => {
            println!("按 Enter 可取消尚未開始的轉換");
            let spawned = thread::Builder::new()
                .name("cancel-listener".to_string())
                .spawn(move || {
                    if enter_pressed(io::stdin().lock()) {
                        token.cancel();
                    }
                });
            if let Err(e) = spawned {
                log::warn!("無法啟動取消監聽執行緒：{}", e);
            }
        }
    }
}

/// 執行一個批次工作並輸出摘要；沒有符合的檔案時返回 `None`
pub fn execute_job(job: JobConfig, no_progress: bool, trigger: CancelTrigger) -> io::Result<Option<JobSummary>> {
    let engine = JobEngine::default();
    let sink = Arc::new(ConsoleProgressSink::new(no_progress));

    match engine.start(job, sink.clone())? {
        JobStart::Empty => Ok(None),
        JobStart::Running(handle) => {
            log::debug!("已派發 {} 個檔案", handle.total());
            install_cancel_trigger(trigger, handle.cancel_token());
            let summary = handle.wait();
            for line in summary_lines(&summary) {
                println!("{}", line);
            }
            Ok(Some(summary))
        }
    }
}

// CLI 配置適配器
pub struct CliConfigAdapter {
    cli: Cli,
}

impl CliConfigAdapter {
    pub fn new(cli: Cli) -> Self {
        CliConfigAdapter { cli }
    }
}

impl ConfigPort for CliConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        validate_input_path(&self.cli.input)?;
        if let Some(patterns) = &self.cli.exclude {
            for pattern in patterns {
                if !is_valid_pattern(pattern) {
                    return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("無效的排除模式: {}", pattern)));
                }
            }
        }

        let output = self.cli.output.clone()
            .unwrap_or_else(|| default_output_dir(&self.cli.input, &self.cli.format));
        log::info!(
            "輸入目錄：{}，輸出目錄：{}，格式：{}，輸入副檔名：{}",
            self.cli.input, output, self.cli.format, self.cli.input_ext
        );

        Ok(AppConfig {
            input: self.cli.input.clone(),
            output,
            format: self.cli.format.clone(),
            input_ext: self.cli.input_ext.clone(),
            exclude: self.cli.exclude.clone(),
            jobs: self.cli.jobs,
            no_progress: self.cli.no_progress,
        })
    }
}
