//! JSON Work Store - 文件系统作品存储实现
//!
//! 实现 WorkRepositoryPort trait

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{RepositoryError, WorkRepositoryPort};
use crate::domain::work::{FailureLog, WorkDocument, WorkName};

/// 失败记录文件扩展名
///
/// `sanitize_key` 的结果不含 `.`，所以 `<key>.failed.json` 不会与任何作品的 `<key>.json` 重名
const FAILURE_LOG_EXTENSION: &str = "failed.json";

/// 把作品名称转为文件名安全的键（非 `[A-Za-z0-9_-]` 字符替换为 `_`）
pub fn sanitize_key(work_name: &str) -> String {
    work_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// JSON 文件作品存储
pub struct JsonWorkStore {
    /// 存储根目录
    data_dir: PathBuf,
}

impl JsonWorkStore {
    /// 创建新的文件存储（目录不存在时创建）
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let data_dir = data_dir.as_ref().to_path_buf();

        fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn work_path(&self, work_name: &WorkName) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", sanitize_key(work_name.as_str())))
    }

    fn failures_path(&self, work_name: &WorkName) -> PathBuf {
        self.data_dir.join(format!(
            "{}.{}",
            sanitize_key(work_name.as_str()),
            FAILURE_LOG_EXTENSION
        ))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, RepositoryError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::IoError(e.to_string())),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RepositoryError::SerializationError(format!("{}: {}", path.display(), e)))
    }

    /// 先写临时文件再重命名，避免读到半写入的文档
    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "JSON file written");
        Ok(())
    }
}

#[async_trait]
impl WorkRepositoryPort for JsonWorkStore {
    async fn find_work(&self, work_name: &WorkName) -> Result<Option<WorkDocument>, RepositoryError> {
        Self::read_json(&self.work_path(work_name)).await
    }

    async fn save_work(&self, document: &WorkDocument) -> Result<(), RepositoryError> {
        Self::write_json(&self.work_path(document.work_name()), document).await
    }

    async fn find_failures(&self, work_name: &WorkName) -> Result<Option<FailureLog>, RepositoryError> {
        Self::read_json(&self.failures_path(work_name)).await
    }

    async fn save_failures(&self, log: &FailureLog) -> Result<(), RepositoryError> {
        Self::write_json(&self.failures_path(log.work_name()), log).await
    }

    async fn list_works(&self) -> Result<Vec<String>, RepositoryError> {
        let mut entries = fs::read_dir(&self.data_dir)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?
        {
            let path = entry.path();
            // 作品文件是 `<key>.json`；失败记录与临时文件的主名里带 `.`
            let is_work_file = path.extension().is_some_and(|ext| ext == "json")
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| !stem.contains('.'));
            if !is_work_file {
                continue;
            }

            match Self::read_json::<WorkDocument>(&path).await {
                Ok(Some(document)) => names.push(document.work_name().as_str().to_string()),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable work file");
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::work::{ChapterNumber, ChapterResult, FailureRecord};
    use tempfile::TempDir;

    async fn store() -> (TempDir, JsonWorkStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonWorkStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    fn document(name: &WorkName, titles: &[&str]) -> WorkDocument {
        let results = titles
            .iter()
            .map(|t| ChapterResult::new(*t, "body", format!("https://ex.com/{}", t)).unwrap())
            .collect();
        WorkDocument::merge(None, name, results).0
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("My Novel: Part 1/2"), "My_Novel__Part_1_2");
        assert_eq!(sanitize_key("ok-name_1"), "ok-name_1");
        assert_eq!(sanitize_key("小说"), "__");
    }

    #[tokio::test]
    async fn test_missing_work_is_none() {
        let (_dir, store) = store().await;
        let name = WorkName::new("Nothing").unwrap();
        assert!(store.find_work(&name).await.unwrap().is_none());
        assert!(store.find_failures(&name).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_work_round_trip_with_sanitized_key() {
        let (dir, store) = store().await;
        let name = WorkName::new("My Novel: Vol 1").unwrap();
        let doc = document(&name, &["One", "Two"]);

        store.save_work(&doc).await.unwrap();

        assert!(dir.path().join("My_Novel__Vol_1.json").exists());
        let loaded = store.find_work(&name).await.unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_failures_use_own_extension() {
        let (dir, store) = store().await;
        let name = WorkName::new("Novel").unwrap();
        let mut log = FailureLog::new(name.clone());
        log.record([FailureRecord::new(
            ChapterNumber::new(3).unwrap(),
            "https://ex.com/3",
            "timeout",
        )]);

        store.save_failures(&log).await.unwrap();

        assert!(dir.path().join("Novel.failed.json").exists());
        let loaded = store.find_failures(&name).await.unwrap().unwrap();
        assert_eq!(loaded.failed_urls(), vec!["https://ex.com/3".to_string()]);
    }

    #[tokio::test]
    async fn test_list_works_skips_failure_files() {
        let (_dir, store) = store().await;
        let a = WorkName::new("Alpha").unwrap();
        let b = WorkName::new("Beta Novel").unwrap();
        store.save_work(&document(&a, &["x"])).await.unwrap();
        store.save_work(&document(&b, &["y"])).await.unwrap();
        store.save_failures(&FailureLog::new(a.clone())).await.unwrap();

        assert_eq!(
            store.list_works().await.unwrap(),
            vec!["Alpha".to_string(), "Beta Novel".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_suffix_name_does_not_clash_with_failure_log() {
        let (_dir, store) = store().await;
        let x = WorkName::new("x").unwrap();
        let x_failed = WorkName::new("x_failed").unwrap();

        let mut log = FailureLog::new(x.clone());
        log.record([FailureRecord::new(
            ChapterNumber::new(2).unwrap(),
            "https://ex.com/2",
            "timeout",
        )]);
        store.save_failures(&log).await.unwrap();
        let doc = document(&x_failed, &["One"]);
        store.save_work(&doc).await.unwrap();

        let loaded = store.find_failures(&x).await.unwrap().unwrap();
        assert_eq!(loaded.failed_urls(), vec!["https://ex.com/2".to_string()]);
        assert_eq!(store.find_work(&x_failed).await.unwrap().unwrap(), doc);
        assert!(store.find_work(&x).await.unwrap().is_none());
        assert_eq!(store.list_works().await.unwrap(), vec!["x_failed".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let (dir, store) = store().await;
        std::fs::write(dir.path().join("Broken.json"), b"{not json").unwrap();

        let err = store
            .find_work(&WorkName::new("Broken").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::SerializationError(_)));
    }
}
