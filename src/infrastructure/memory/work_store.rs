//! In-Memory Work Store Implementation
//!
//! `storage.backend = "memory"` 时使用，进程退出即丢失

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{RepositoryError, WorkRepositoryPort};
use crate::domain::work::{FailureLog, WorkDocument, WorkName};

/// 内存作品存储
pub struct InMemoryWorkStore {
    works: DashMap<String, WorkDocument>,
    failures: DashMap<String, FailureLog>,
}

impl InMemoryWorkStore {
    pub fn new() -> Self {
        Self {
            works: DashMap::new(),
            failures: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryWorkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkRepositoryPort for InMemoryWorkStore {
    async fn find_work(&self, work_name: &WorkName) -> Result<Option<WorkDocument>, RepositoryError> {
        Ok(self.works.get(work_name.as_str()).map(|w| w.clone()))
    }

    async fn save_work(&self, document: &WorkDocument) -> Result<(), RepositoryError> {
        self.works
            .insert(document.work_name().as_str().to_string(), document.clone());
        tracing::debug!(
            work_name = %document.work_name(),
            chapter_count = document.chapter_count(),
            "Work saved (memory)"
        );
        Ok(())
    }

    async fn find_failures(&self, work_name: &WorkName) -> Result<Option<FailureLog>, RepositoryError> {
        Ok(self.failures.get(work_name.as_str()).map(|f| f.clone()))
    }

    async fn save_failures(&self, log: &FailureLog) -> Result<(), RepositoryError> {
        self.failures
            .insert(log.work_name().as_str().to_string(), log.clone());
        Ok(())
    }

    async fn list_works(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names: Vec<String> = self.works.iter().map(|w| w.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::work::ChapterResult;

    #[tokio::test]
    async fn test_save_and_find() {
        let store = InMemoryWorkStore::new();
        let name = WorkName::new("Novel").unwrap();
        assert!(store.find_work(&name).await.unwrap().is_none());

        let (document, _) = WorkDocument::merge(
            None,
            &name,
            vec![ChapterResult::new("T", "C", "u").unwrap()],
        );
        store.save_work(&document).await.unwrap();

        assert_eq!(store.find_work(&name).await.unwrap(), Some(document));
        assert_eq!(store.list_works().await.unwrap(), vec!["Novel".to_string()]);
    }
}
