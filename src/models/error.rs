use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 讓工作無法開始的配置錯誤；發生時不會派發任何項目
#[derive(Debug, Error)]
pub enum JobError {
    #[error("輸入路徑 '{path}' 不存在或不是目錄")]
    NotADirectory { path: PathBuf },

    #[error("不支援的輸出格式：{format}（可用：png、jpeg、bmp、gif、tiff）")]
    UnsupportedFormat { format: String },

    #[error("無法建立輸出目錄 '{path}'：{source}")]
    OutputDirCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("無效的模式：{pattern}")]
    InvalidPattern { pattern: String },

    #[error("工作執行緒數必須大於 0")]
    InvalidParallelism,

    #[error("讀取輸入目錄失敗：{0}")]
    Discovery(#[from] walkdir::Error),

    #[error("無法建立工作執行緒池：{0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("無法啟動控制執行緒：{0}")]
    Spawn(#[source] io::Error),
}

impl From<JobError> for io::Error {
    fn from(err: JobError) -> Self {
        let kind = match &err {
            JobError::NotADirectory { .. } => io::ErrorKind::NotFound,
            JobError::UnsupportedFormat { .. }
            | JobError::InvalidPattern { .. }
            | JobError::InvalidParallelism => io::ErrorKind::InvalidInput,
            JobError::OutputDirCreateFailed { source, .. } => source.kind(),
            JobError::Discovery(_) | JobError::WorkerPool(_) | JobError::Spawn(_) => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, err.to_string())
    }
}
