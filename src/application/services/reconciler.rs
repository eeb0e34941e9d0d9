//! 合并 / 存储协调
//!
//! 在作品锁内完成: 读取 -> 合并 -> 修复并记录失败 -> （可选）写回

use std::sync::Arc;

use super::work_locks::WorkLocks;
use crate::application::error::ApplicationError;
use crate::application::ports::WorkRepositoryPort;
use crate::domain::work::{
    ChapterResult, FailureLog, FailureRecord, MergeReport, WorkDocument, WorkName,
};
use crate::infrastructure::events::EventPublisher;

/// 一次协调的结果
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub document: WorkDocument,
    pub merge: MergeReport,
    pub failure_log: FailureLog,
    /// 本次从失败记录中移除的条数
    pub healed: usize,
    pub persisted: bool,
}

/// 合并协调器
pub struct WorkReconciler {
    repo: Arc<dyn WorkRepositoryPort>,
    locks: Arc<WorkLocks>,
    event_publisher: Arc<EventPublisher>,
}

impl WorkReconciler {
    pub fn new(
        repo: Arc<dyn WorkRepositoryPort>,
        locks: Arc<WorkLocks>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            repo,
            locks,
            event_publisher,
        }
    }

    /// 合并一次运行的结果
    ///
    /// `persist = false` 时只计算合并后的文档，不写入任何内容。
    /// 作品文档在第一次有章节写入时才创建。
    pub async fn reconcile(
        &self,
        work_name: &WorkName,
        chapters: Vec<ChapterResult>,
        failures: Vec<FailureRecord>,
        persist: bool,
    ) -> Result<Reconciled, ApplicationError> {
        let _guard = self.locks.lock(work_name).await;

        let existing = self.repo.find_work(work_name).await?;
        let (document, merge) = WorkDocument::merge(existing, work_name, chapters);

        let mut failure_log = self
            .repo
            .find_failures(work_name)
            .await?
            .unwrap_or_else(|| FailureLog::new(work_name.clone()));
        // 只有按原编号重新抓取的章节才能修复失败记录，顺序追加的章节占用的编号与之无关
        let healed = failure_log.heal(merge.claimed.iter().copied());
        let recorded = failures.len();
        failure_log.record(failures);

        if persist {
            if merge.saved() > 0 {
                self.repo.save_work(&document).await?;
                self.event_publisher.publish_work_updated(
                    work_name.as_str(),
                    document.chapter_count(),
                    merge.appended.iter().map(|n| n.get()).collect(),
                    merge.replaced.iter().map(|n| n.get()).collect(),
                );
            }
            if healed > 0 || recorded > 0 {
                self.repo.save_failures(&failure_log).await?;
                self.event_publisher.publish_failures_recorded(
                    work_name.as_str(),
                    failure_log.failures().len(),
                    healed,
                );
            }
        }

        tracing::info!(
            work_name = %work_name,
            appended = merge.appended.len(),
            replaced = merge.replaced.len(),
            failed = recorded,
            healed = healed,
            chapter_count = document.chapter_count(),
            persist = persist,
            "Work reconciled"
        );

        Ok(Reconciled {
            document,
            merge,
            failure_log,
            healed,
            persisted: persist,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::WorkRepositoryPort;
    use crate::domain::work::ChapterNumber;
    use crate::infrastructure::memory::InMemoryWorkStore;

    fn setup() -> (Arc<InMemoryWorkStore>, WorkReconciler) {
        let store = Arc::new(InMemoryWorkStore::new());
        let reconciler = WorkReconciler::new(
            store.clone(),
            Arc::new(WorkLocks::new()),
            Arc::new(EventPublisher::new()),
        );
        (store, reconciler)
    }

    fn name() -> WorkName {
        WorkName::new("My Novel").unwrap()
    }

    fn numbered(n: u32) -> ChapterResult {
        ChapterResult::new(format!("Chapter {}", n), format!("Body {}", n), format!("u/{}", n))
            .unwrap()
            .numbered(ChapterNumber::new(n).unwrap())
    }

    fn failure(n: u32) -> FailureRecord {
        FailureRecord::new(ChapterNumber::new(n).unwrap(), format!("u/{}", n), "timeout")
    }

    #[tokio::test]
    async fn test_first_save_creates_document() {
        let (store, reconciler) = setup();

        let result = reconciler
            .reconcile(&name(), vec![numbered(1), numbered(2)], vec![], true)
            .await
            .unwrap();

        assert_eq!(result.document.chapter_count(), 2);
        let stored = store.find_work(&name()).await.unwrap().unwrap();
        assert_eq!(stored, result.document);
        assert!(store.find_failures(&name()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failures_recorded_then_healed() {
        let (store, reconciler) = setup();

        reconciler
            .reconcile(&name(), vec![numbered(1)], vec![failure(2), failure(3)], true)
            .await
            .unwrap();
        let log = store.find_failures(&name()).await.unwrap().unwrap();
        assert_eq!(log.failures().len(), 2);

        let result = reconciler
            .reconcile(&name(), vec![numbered(2)], vec![], true)
            .await
            .unwrap();
        assert_eq!(result.healed, 1);

        let log = store.find_failures(&name()).await.unwrap().unwrap();
        assert_eq!(log.failed_urls(), vec!["u/3".to_string()]);
        let numbers: Vec<u32> = store
            .find_work(&name())
            .await
            .unwrap()
            .unwrap()
            .chapter_numbers()
            .iter()
            .map(|n| n.get())
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_appended_chapter_does_not_heal_failure() {
        let (store, reconciler) = setup();

        reconciler
            .reconcile(
                &name(),
                (1..=4).map(numbered).collect(),
                vec![failure(5)],
                true,
            )
            .await
            .unwrap();

        // 无编号章节顺序追加为 5，但 u/5 从未被重新抓取
        let side = ChapterResult::new("Side story", "body", "u/side").unwrap();
        let result = reconciler
            .reconcile(&name(), vec![side], vec![], true)
            .await
            .unwrap();

        assert_eq!(result.merge.appended, vec![ChapterNumber::new(5).unwrap()]);
        assert_eq!(result.healed, 0);
        let log = store.find_failures(&name()).await.unwrap().unwrap();
        assert_eq!(log.failed_urls(), vec!["u/5".to_string()]);
        assert_eq!(
            log.known_counters().get("u/5"),
            Some(&ChapterNumber::new(5).unwrap())
        );
    }

    #[tokio::test]
    async fn test_no_persist_writes_nothing() {
        let (store, reconciler) = setup();

        let result = reconciler
            .reconcile(&name(), vec![numbered(1)], vec![failure(2)], false)
            .await
            .unwrap();

        assert!(!result.persisted);
        assert_eq!(result.document.chapter_count(), 1);
        assert_eq!(result.failure_log.failures().len(), 1);
        assert!(store.find_work(&name()).await.unwrap().is_none());
        assert!(store.find_failures(&name()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_all_failed_does_not_create_document() {
        let (store, reconciler) = setup();

        reconciler
            .reconcile(&name(), vec![], vec![failure(1)], true)
            .await
            .unwrap();

        assert!(store.find_work(&name()).await.unwrap().is_none());
        assert!(store.find_failures(&name()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_merges_are_serialized() {
        let (store, reconciler) = setup();
        let reconciler = Arc::new(reconciler);

        let unnumbered = |n: u32| {
            ChapterResult::new(format!("T{}", n), "body", format!("x/{}", n)).unwrap()
        };
        let tasks: Vec<_> = (1..=8)
            .map(|n| {
                let reconciler = reconciler.clone();
                let chapter = unnumbered(n);
                tokio::spawn(async move {
                    reconciler
                        .reconcile(&name(), vec![chapter], vec![], true)
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let document = store.find_work(&name()).await.unwrap().unwrap();
        let numbers: Vec<u32> = document.chapter_numbers().iter().map(|n| n.get()).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<_>>());
    }
}
