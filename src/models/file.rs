use std::path::PathBuf;

use crate::config::config::OutputFormat;
use crate::models::job::WorkItem;

#[derive(Clone, Debug)]
pub struct FileCollectInput {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub input_extension: String,
    pub format: OutputFormat,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug)]
pub struct FileCollectOutput {
    pub items: Vec<WorkItem>,
    /// 副檔名符合但被排除模式略過的檔案數
    pub excluded: usize,
}
