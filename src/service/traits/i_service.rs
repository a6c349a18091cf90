use crate::models::error::JobError;
use crate::models::file::{FileCollectInput, FileCollectOutput};
use crate::models::job::{ConversionResult, WorkItem};

// File 服務接口，負責掃描輸入目錄
pub trait FileServiceTrait: Send + Sync {
    /// 收集輸入目錄第一層中符合副檔名的檔案，並推導輸出路徑
    /// # 參數
    /// - input: 檔案收集的輸入參數
    /// # 回傳
    /// - 依檔名排序的轉換項目；輸入路徑不是目錄時返回 `JobError::NotADirectory`
    fn collect_files(&self, input: FileCollectInput) -> Result<FileCollectOutput, JobError>;
}

// 影像編解碼接口，對引擎而言是不透明的單項轉換
pub trait ImageCodecTrait: Send + Sync {
    /// 轉換單一項目。所有失敗都必須以 `success=false` 回傳，不可向外傳遞錯誤
    fn convert(&self, item: &WorkItem) -> ConversionResult;
}
