use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::error::JobError;
use crate::models::file::{FileCollectInput, FileCollectOutput};
use crate::models::job::WorkItem;
use crate::service::traits::i_service::FileServiceTrait;
use crate::utils::utils::create_exclude_set;

/// 檔案服務，只掃描輸入目錄的第一層
pub struct FileService;

impl FileService {
    pub fn new() -> Self {
        FileService
    }
}

impl Default for FileService {
    fn default() -> Self {
        Self::new()
    }
}

/// 檔名是否以 `.<ext>` 結尾（不分大小寫）
pub fn has_extension(file_name: &str, ext: &str) -> bool {
    let suffix = format!(".{}", ext.trim_start_matches('.').to_lowercase());
    file_name.to_lowercase().ends_with(&suffix)
}

impl FileServiceTrait for FileService {
    fn collect_files(&self, input: FileCollectInput) -> Result<FileCollectOutput, JobError> {
        if !input.input_dir.is_dir() {
            return Err(JobError::NotADirectory { path: input.input_dir });
        }
        let exclude_set = create_exclude_set(&input.exclude_patterns)?;

        let mut items = Vec::new();
        let mut excluded = 0;
        let walker = WalkDir::new(&input.input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // 根目錄本身無法讀取才是致命錯誤，個別項目只略過
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!("無法讀取項目，略過：{}", e);
                    continue;
                }
            };
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !entry.file_type().is_file() {
                debug!("略過非檔案項目：{}", entry.path().display());
                continue;
            }
            if !has_extension(&file_name, &input.input_extension) {
                debug!("副檔名不符，略過：{}", file_name);
                continue;
            }
            if exclude_set.is_match(&file_name) {
                debug!("符合排除模式，略過：{}", file_name);
                excluded += 1;
                continue;
            }
            items.push(WorkItem::new(entry.into_path(), &input.output_dir, input.format));
        }

        info!(
            "在 {} 中找到 {} 個 .{} 檔案（排除 {} 個）",
            input.input_dir.display(),
            items.len(),
            input.input_extension,
            excluded
        );
        Ok(FileCollectOutput { items, excluded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::OutputFormat;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn collect_input(dir: &Path, exclude: Vec<String>) -> FileCollectInput {
        FileCollectInput {
            input_dir: dir.to_path_buf(),
            output_dir: PathBuf::from("/out"),
            input_extension: "heic".to_string(),
            format: OutputFormat::Png,
            exclude_patterns: exclude,
        }
    }

    fn discover(input: FileCollectInput) -> Result<Vec<WorkItem>, JobError> {
        FileService::new().collect_files(input).map(|out| out.items)
    }

    fn names(items: &[WorkItem]) -> Vec<String> {
        items.iter().map(|i| i.file_name()).collect()
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(has_extension("a.heic", "heic"));
        assert!(has_extension("A.HEIC", "heic"));
        assert!(has_extension("a.HeIc", ".HEIC"));
        assert!(!has_extension("a.heic.txt", "heic"));
        assert!(!has_extension("heic", "heic"));
    }

    #[test]
    fn collects_matching_top_level_files_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.heic"), b"x").unwrap();
        fs::write(tmp.path().join("A.HEIC"), b"x").unwrap();
        fs::write(tmp.path().join("note.txt"), b"x").unwrap();
        fs::create_dir(tmp.path().join("dir.heic")).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested").join("c.heic"), b"x").unwrap();

        let items = discover(collect_input(tmp.path(), Vec::new())).unwrap();
        assert_eq!(names(&items), vec!["A.HEIC", "b.heic"]);
        assert_eq!(items[0].output_path, PathBuf::from("/out/A.png"));
        assert_eq!(items[1].output_path, PathBuf::from("/out/b.png"));
    }

    #[test]
    fn exclude_patterns_skip_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.heic"), b"x").unwrap();
        fs::write(tmp.path().join("skip_me.heic"), b"x").unwrap();

        let out = FileService::new()
            .collect_files(collect_input(tmp.path(), vec!["skip*".to_string()]))
            .unwrap();
        assert_eq!(names(&out.items), vec!["keep.heic"]);
        assert_eq!(out.excluded, 1);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.heic"), b"x").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("stale_link.txt")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone.heic"), tmp.path().join("stale.heic")).unwrap();

        let items = discover(collect_input(tmp.path(), Vec::new())).unwrap();
        assert_eq!(names(&items), vec!["a.heic"]);
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let items = discover(collect_input(tmp.path(), Vec::new())).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn missing_directory_is_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        let err = discover(collect_input(&tmp.path().join("missing"), Vec::new())).unwrap_err();
        assert!(matches!(err, JobError::NotADirectory { .. }));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.heic");
        fs::write(&file, b"x").unwrap();
        let err = discover(collect_input(&file, Vec::new())).unwrap_err();
        assert!(matches!(err, JobError::NotADirectory { .. }));
    }
}
