use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::config::OutputFormat;

/// 單一轉換項目：輸入檔與推導出的輸出檔
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub format: OutputFormat,
}

impl WorkItem {
    /// 輸出路徑 = <輸出目錄>/<輸入檔名（不含副檔名）>.<格式副檔名>
    pub fn new(input_path: PathBuf, output_dir: &Path, format: OutputFormat) -> Self {
        let stem = input_path
            .file_stem()
            .unwrap_or(input_path.as_os_str())
            .to_string_lossy()
            .to_string();
        let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));
        WorkItem { input_path, output_path, format }
    }

    pub fn file_name(&self) -> String {
        self.input_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input_path.display().to_string())
    }
}

/// 呼叫端提供的工作配置，`output_format` 保留原始字串，由引擎驗證
#[derive(Clone, Debug)]
pub struct JobConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_format: String,
    pub input_extension: String,
    pub exclude: Vec<String>,
    pub parallelism: Option<usize>,
}

impl JobConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        output_format: impl Into<String>,
    ) -> Self {
        JobConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            output_format: output_format.into(),
            input_extension: "heic".to_string(),
            exclude: Vec::new(),
            parallelism: None,
        }
    }

    pub fn with_input_extension(mut self, ext: impl Into<String>) -> Self {
        self.input_extension = ext.into();
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ConversionResult {
    pub item: WorkItem,
    pub success: bool,
    /// 成功時為輸出路徑，失敗時為診斷訊息
    pub message: String,
}

impl ConversionResult {
    pub fn succeeded(item: WorkItem) -> Self {
        let message = item.output_path.display().to_string();
        ConversionResult { item, success: true, message }
    }

    pub fn failed(item: WorkItem, message: impl Into<String>) -> Self {
        ConversionResult { item, success: false, message: message.into() }
    }
}

/// JobState 的唯讀快照，提供給 ProgressSink
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobSnapshot {
    pub total: usize,
    pub completed: usize,
    pub success: usize,
    pub failure: usize,
}

#[derive(Clone, Debug)]
pub struct JobSummary {
    pub success: usize,
    pub failure: usize,
    pub total: usize,
    pub was_cancelled: bool,
    pub elapsed: Duration,
    pub failures: Vec<ConversionResult>,
}

impl JobSummary {
    pub fn completed(&self) -> usize {
        self.success + self.failure
    }

    /// 因取消而未派發的項目數
    pub fn skipped(&self) -> usize {
        self.total - self.completed()
    }
}

/// 協作式取消旗標，可複製給任意執行緒
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_stem_and_format_extension() {
        let item = WorkItem::new(
            PathBuf::from("/in/IMG_0001.HEIC"),
            Path::new("/out"),
            OutputFormat::Jpeg,
        );
        assert_eq!(item.output_path, PathBuf::from("/out/IMG_0001.jpg"));
        assert_eq!(item.file_name(), "IMG_0001.HEIC");
    }

    #[test]
    fn only_last_extension_is_replaced() {
        let item = WorkItem::new(PathBuf::from("/in/a.b.heic"), Path::new("/out"), OutputFormat::Png);
        assert_eq!(item.output_path, PathBuf::from("/out/a.b.png"));
    }

    #[test]
    fn result_messages() {
        let item = WorkItem::new(PathBuf::from("/in/a.heic"), Path::new("/out"), OutputFormat::Png);
        let ok = ConversionResult::succeeded(item.clone());
        assert!(ok.success);
        assert_eq!(ok.message, item.output_path.display().to_string());

        let bad = ConversionResult::failed(item, "壞檔");
        assert!(!bad.success);
        assert_eq!(bad.message, "壞檔");
    }

    #[test]
    fn summary_counts_skipped() {
        let summary = JobSummary {
            success: 3,
            failure: 1,
            total: 6,
            was_cancelled: true,
            elapsed: Duration::from_millis(5),
            failures: Vec::new(),
        };
        assert_eq!(summary.completed(), 4);
        assert_eq!(summary.skipped(), 2);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
