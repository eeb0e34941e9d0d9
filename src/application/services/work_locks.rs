//! 按作品存储键串行化读-改-写
//!
//! 锁以 `sanitize_key` 之后的存储键为准：两个名称映射到同一个文件时必须互斥。
//! 最后一个持有者释放后条目即被移除，表的大小受并发中的作品数约束。

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::work::WorkName;
use crate::infrastructure::persistence::sanitize_key;

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// 作品级异步互斥锁表
#[derive(Default)]
pub struct WorkLocks {
    locks: Arc<LockTable>,
}

/// 作品锁 guard，释放时清理无人使用的条目
pub struct WorkLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: Arc<LockTable>,
}

impl Drop for WorkLockGuard {
    fn drop(&mut self) {
        // 先解锁，再检查是否还有等待者持有同一把锁
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl WorkLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取作品锁，guard 释放前映射到同一存储键的其它合并会等待
    pub async fn lock(&self, work_name: &WorkName) -> WorkLockGuard {
        let key = sanitize_key(work_name.as_str());
        let mutex = self.locks.entry(key.clone()).or_default().value().clone();
        let guard = mutex.lock_owned().await;
        WorkLockGuard {
            guard: Some(guard),
            key,
            locks: self.locks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_work_is_serialized() {
        let locks = Arc::new(WorkLocks::new());
        let name = WorkName::new("Novel").unwrap();

        let guard = locks.lock(&name).await;
        let waiter = {
            let locks = locks.clone();
            let name = name.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&name).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_works_do_not_block() {
        let locks = WorkLocks::new();
        let _a = locks.lock(&WorkName::new("A").unwrap()).await;
        let b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock(&WorkName::new("B").unwrap()),
        )
        .await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_names_sharing_storage_key_contend() {
        let locks = WorkLocks::new();
        let _spaced = locks.lock(&WorkName::new("a b").unwrap()).await;

        let underscored = tokio::time::timeout(
            Duration::from_millis(50),
            locks.lock(&WorkName::new("a_b").unwrap()),
        )
        .await;
        assert!(underscored.is_err());
    }

    #[tokio::test]
    async fn test_entries_are_removed_after_release() {
        let locks = Arc::new(WorkLocks::new());
        for i in 0..10 {
            let _guard = locks.lock(&WorkName::new(format!("Work {i}")).unwrap()).await;
        }
        assert!(locks.locks.is_empty());

        let name = WorkName::new("Novel").unwrap();
        let guard = locks.lock(&name).await;
        let waiter = {
            let locks = locks.clone();
            let name = name.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&name).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // 等待者仍持有同一把锁，条目保留
        drop(guard);
        assert_eq!(locks.locks.len(), 1);

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.locks.is_empty());
    }
}
