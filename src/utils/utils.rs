use std::io;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use regex::RegexSet;

use crate::config::config::is_valid_pattern;
use crate::facade::ports::facade_ports::ProgressSink;
use crate::models::error::JobError;
use crate::models::job::{ConversionResult, JobSnapshot, JobSummary};

pub fn setup_logging(log_level: &str) -> io::Result<()> {
    let log_level_filter = match log_level {
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    // 互動模式與 CLI 模式可能各呼叫一次，重複初始化不視為錯誤
    let _ = env_logger::Builder::new()
        .filter_level(log_level_filter)
        .try_init();
    Ok(())
}

/// 將 `*` 萬用字元模式轉為不分大小寫、完整比對檔名的 RegexSet
pub fn create_exclude_set(exclude: &[String]) -> Result<RegexSet, JobError> {
    for pattern in exclude {
        if !is_valid_pattern(pattern) {
            return Err(JobError::InvalidPattern { pattern: pattern.clone() });
        }
    }
    let patterns: Vec<_> = exclude.iter()
        .map(|p| {
            let body = p.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
            format!("(?i)^{}$", body)
        })
        .collect();

    RegexSet::new(&patterns).map_err(|e| {
        log::warn!("無效的排除模式: {}", e);
        JobError::InvalidPattern { pattern: exclude.join(",") }
    })
}

pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1} 秒", secs)
    } else {
        format!("{} 分 {:02} 秒", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    }
}

/// 以 indicatif 進度條呈現工作進度的 ProgressSink
pub struct ConsoleProgressSink {
    pb: ProgressBar,
    no_progress: bool,
}

impl ConsoleProgressSink {
    pub fn new(no_progress: bool) -> Self {
        let pb = if no_progress {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40}] {pos}/{len} ETA: {eta_precise}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            pb
        };
        ConsoleProgressSink {
            pb,
            no_progress,
        }
    }
}

impl ProgressSink for ConsoleProgressSink {
    fn on_progress(&self, snapshot: &JobSnapshot, result: &ConversionResult) {
        if !result.success {
            let line = format!("轉換 {} 失敗：{}", result.item.file_name(), result.message);
            if self.no_progress {
                eprintln!("{}", line);
            } else {
                self.pb.println(line);
            }
        }
        self.pb.set_length(snapshot.total as u64);
        self.pb.set_position(snapshot.completed as u64);
        self.pb.set_message(format!(
            "成功 {} 失敗 {}：{}",
            snapshot.success,
            snapshot.failure,
            result.item.file_name()
        ));
    }

    fn on_summary(&self, summary: &JobSummary) {
        let msg = if summary.was_cancelled {
            format!("已取消，完成 {}/{}", summary.completed(), summary.total)
        } else {
            format!("處理完成，共 {} 個檔案", summary.total)
        };
        self.pb.finish_with_message(msg);
    }

    fn on_empty(&self, input_dir: &Path) {
        self.pb.finish_and_clear();
        println!("在 {} 中找不到符合的檔案，未進行任何轉換", input_dir.display());
    }
}

/// 最終摘要文字，成功與失敗數一律列出
pub fn summary_lines(summary: &JobSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "成功 {}，失敗 {}，共 {}（耗時 {}）",
        summary.success,
        summary.failure,
        summary.total,
        format_duration(summary.elapsed)
    )];
    if summary.was_cancelled {
        lines.push(format!("工作已取消，{} 個檔案因取消而略過", summary.skipped()));
    }
    for failed in &summary.failures {
        lines.push(format!("  失敗：{} - {}", failed.item.input_path.display(), failed.message));
    }
    lines
}
