use std::path::Path;

use crate::models::job::{ConversionResult, JobSnapshot, JobSummary};

// 進度回報的 Port，由 UI 或 CLI 實作
//
// 引擎不保證回呼所在的執行緒；實作者需自行處理執行緒安全，且不可長時間阻塞。
pub trait ProgressSink: Send + Sync {
    /// 每彙整一筆結果後呼叫
    fn on_progress(&self, snapshot: &JobSnapshot, result: &ConversionResult);

    /// 工作結束時呼叫，每個工作恰好一次
    fn on_summary(&self, summary: &JobSummary);

    /// 輸入目錄中沒有符合的檔案
    fn on_empty(&self, _input_dir: &Path) {}
}
