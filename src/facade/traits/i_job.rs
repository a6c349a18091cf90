use std::sync::Arc;

use crate::facade::job_engine::JobStart;
use crate::facade::ports::facade_ports::ProgressSink;
use crate::models::error::JobError;
use crate::models::job::{JobConfig, JobSummary};

/// 工作結束後的結果：目錄中沒有檔案，或已完成（可能因取消而提早結束）
#[derive(Debug)]
pub enum JobOutcome {
    Empty,
    Completed(JobSummary),
}

// Facade 接口，負責協調批次轉換流程
pub trait JobEngineTrait: Send + Sync {
    /// 驗證配置、建立輸出目錄、掃描檔案並開始派發
    /// # 參數
    /// - config: 工作配置
    /// - sink: 接收進度與摘要的回呼
    /// # 回傳
    /// - 成功時返回 `JobStart`，配置錯誤時返回 `JobError` 且不派發任何項目
    fn start(&self, config: JobConfig, sink: Arc<dyn ProgressSink>) -> Result<JobStart, JobError>;

    /// 啟動並等待工作結束
    fn run(&self, config: JobConfig, sink: Arc<dyn ProgressSink>) -> Result<JobOutcome, JobError> {
        match self.start(config, sink)? {
            JobStart::Empty => Ok(JobOutcome::Empty),
            JobStart::Running(handle) => Ok(JobOutcome::Completed(handle.wait())),
        }
    }
}
