use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::config::config::{is_valid_pattern, OutputFormat};
use crate::facade::ports::facade_ports::ProgressSink;
use crate::facade::traits::i_job::JobEngineTrait;
use crate::models::error::JobError;
use crate::models::file::FileCollectInput;
use crate::models::job::{CancelToken, ConversionResult, JobConfig, JobSnapshot, JobSummary, WorkItem};
use crate::service::file::FileService;
use crate::service::image_codec::ImageCodecService;
use crate::service::traits::i_service::{FileServiceTrait, ImageCodecTrait};
use crate::utils::utils::create_exclude_set;

/// 每個工作的計數器，只由彙整執行緒修改
#[derive(Debug)]
pub(crate) struct JobState {
    total: usize,
    completed: usize,
    success: usize,
    failure: usize,
}

impl JobState {
    pub(crate) fn new(total: usize) -> Self {
        JobState { total, completed: 0, success: 0, failure: 0 }
    }

    pub(crate) fn record(&mut self, result: &ConversionResult) -> JobSnapshot {
        debug_assert!(self.completed < self.total, "收到的結果多於派發的項目");
        self.completed += 1;
        if result.success {
            self.success += 1;
        } else {
            self.failure += 1;
        }
        self.snapshot()
    }

    pub(crate) fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            total: self.total,
            completed: self.completed,
            success: self.success,
            failure: self.failure,
        }
    }
}

pub enum JobStart {
    /// 沒有符合的檔案，未啟動任何工作執行緒
    Empty,
    Running(JobHandle),
}

/// 執行中工作的控制代碼，可取消或等待摘要
pub struct JobHandle {
    cancel: CancelToken,
    total: usize,
    control: thread::JoinHandle<JobSummary>,
}

impl JobHandle {
    /// 協作式取消：已開始的項目會完成，尚未開始的項目不再派發
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            info!("收到取消要求，等待進行中的項目完成");
        }
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.control.is_finished()
    }

    /// 等待所有已派發項目完成並取得摘要
    pub fn wait(self) -> JobSummary {
        match self.control.join() {
            Ok(summary) => summary,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

pub struct JobEngine {
    file_service: Box<dyn FileServiceTrait>,
    codec: Arc<dyn ImageCodecTrait>,
}

impl JobEngine {
    pub fn new(file_service: Box<dyn FileServiceTrait>, codec: Arc<dyn ImageCodecTrait>) -> Self {
        JobEngine { file_service, codec }
    }

    pub fn with_codec(codec: Arc<dyn ImageCodecTrait>) -> Self {
        JobEngine::new(Box::new(FileService::new()), codec)
    }

    fn validate(config: &JobConfig) -> Result<OutputFormat, JobError> {
        if !config.input_dir.is_dir() {
            return Err(JobError::NotADirectory { path: config.input_dir.clone() });
        }
        let format = config.output_format.parse::<OutputFormat>()
            .map_err(|format| JobError::UnsupportedFormat { format })?;
        if !is_valid_pattern(config.input_extension.trim_start_matches('.')) {
            return Err(JobError::InvalidPattern { pattern: config.input_extension.clone() });
        }
        create_exclude_set(&config.exclude)?;
        if config.parallelism == Some(0) {
            return Err(JobError::InvalidParallelism);
        }
        Ok(format)
    }
}

impl Default for JobEngine {
    fn default() -> Self {
        JobEngine::with_codec(Arc::new(ImageCodecService::new()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知錯誤".to_string()
    }
}

/// 呼叫轉換服務；即使實作 panic 也只會變成一筆失敗結果
fn convert_isolated(codec: &dyn ImageCodecTrait, item: &WorkItem) -> ConversionResult {
    match panic::catch_unwind(AssertUnwindSafe(|| codec.convert(item))) {
        Ok(result) => result,
        Err(payload) => ConversionResult::failed(
            item.clone(),
            format!("轉換時發生未預期的錯誤：{}", panic_message(payload.as_ref())),
        ),
    }
}

impl JobEngineTrait for JobEngine {
    fn start(&self, config: JobConfig, sink: Arc<dyn ProgressSink>) -> Result<JobStart, JobError> {
        let format = Self::validate(&config)?;

        fs::create_dir_all(&config.output_dir).map_err(|source| JobError::OutputDirCreateFailed {
            path: config.output_dir.clone(),
            source,
        })?;

        let collected = self.file_service.collect_files(FileCollectInput {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            input_extension: config.input_extension.clone(),
            format,
            exclude_patterns: config.exclude.clone(),
        })?;
        let items = collected.items;

        if items.is_empty() {
            warn!("無符合條件的檔案可處理：{}", config.input_dir.display());
            sink.on_empty(&config.input_dir);
            return Ok(JobStart::Empty);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallelism.unwrap_or(0))
            .thread_name(|i| format!("convert-worker-{}", i))
            .build()?;

        let total = items.len();
        info!(
            "開始轉換 {} 個檔案為 {}，輸出目錄：{}，工作執行緒：{}",
            total,
            format,
            config.output_dir.display(),
            pool.current_num_threads()
        );

        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let summary_cancel = cancel.clone();
        let codec = Arc::clone(&self.codec);
        let started = Instant::now();

        let control = thread::Builder::new()
            .name("job-aggregator".to_string())
            .spawn(move || {
                let (tx, rx) = mpsc::channel::<ConversionResult>();

                pool.spawn(move || {
                    items.into_par_iter().for_each_with(tx, |tx, item| {
                        if worker_cancel.is_cancelled() {
                            return;
                        }
                        let result = convert_isolated(codec.as_ref(), &item);
                        // 彙整端只會在 sink panic 時提早關閉
                        let _ = tx.send(result);
                    });
                });

                let mut state = JobState::new(total);
                let mut failures = Vec::new();
                for result in rx {
                    let snapshot = state.record(&result);
                    if !result.success {
                        warn!("轉換 {} 失敗: {}", result.item.input_path.display(), result.message);
                    }
                    sink.on_progress(&snapshot, &result);
                    if !result.success {
                        failures.push(result);
                    }
                }
                drop(pool);

                let snapshot = state.snapshot();
                let summary = JobSummary {
                    success: snapshot.success,
                    failure: snapshot.failure,
                    total,
                    was_cancelled: summary_cancel.is_cancelled(),
                    elapsed: started.elapsed(),
                    failures,
                };
                info!(
                    "工作結束：成功 {}，失敗 {}，共 {}{}",
                    summary.success,
                    summary.failure,
                    summary.total,
                    if summary.was_cancelled { "（已取消）" } else { "" }
                );
                sink.on_summary(&summary);
                summary
            })
            .map_err(JobError::Spawn)?;

        Ok(JobStart::Running(JobHandle { cancel, total, control }))
    }
}
