//! 有界并发任务执行器
//!
//! 固定数量的逻辑 worker 从共享游标领取任务（拉取模型），
//! 单个任务失败不影响其它任务，结果按输入顺序返回。

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

/// 默认并发上限
pub const DEFAULT_CONCURRENCY: usize = 5;

/// 取消后未领取任务的错误信息
pub const CANCELLED: &str = "cancelled";

/// 单个任务的结果，`index` 为其在输入中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome<R> {
    pub index: usize,
    pub result: Result<R, String>,
}

impl<R> TaskOutcome<R> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 有界并发执行器
#[derive(Debug, Clone)]
pub struct TaskRunner {
    concurrency: usize,
    cancel: Option<CancellationToken>,
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl TaskRunner {
    /// 并发数为 0 时按 1 处理
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            cancel: None,
        }
    }

    /// 绑定取消令牌，每次领取任务前检查
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 执行全部任务
    ///
    /// - 同时运行的任务数不超过 `min(concurrency, items.len())`
    /// - `on_success` 对每个成功任务按完成顺序调用恰好一次
    /// - 任务错误转为字符串保存在结果中，不会中止运行
    /// - 取消后尚未领取的任务以 `"cancelled"` 结束，已在执行的任务正常完成
    pub async fn run<I, R, E, F, Fut, S>(
        &self,
        items: &[I],
        worker: F,
        on_success: S,
    ) -> Vec<TaskOutcome<R>>
    where
        F: Fn(usize, &I) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: Display,
        S: Fn(usize, &R),
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let cursor = AtomicUsize::new(0);
        let cursor = &cursor;
        let worker = &worker;
        let on_success = &on_success;
        let cancel = self.cancel.as_ref();

        let lanes = (0..self.concurrency.min(total)).map(|_| async move {
            let mut finished = Vec::new();
            loop {
                if cancel.is_some_and(|token| token.is_cancelled()) {
                    break;
                }
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                if index >= total {
                    break;
                }

                let result = worker(index, &items[index])
                    .await
                    .map_err(|e| e.to_string());
                if let Ok(value) = &result {
                    on_success(index, value);
                }
                finished.push((index, result));
            }
            finished
        });

        let mut slots: Vec<Option<Result<R, String>>> = (0..total).map(|_| None).collect();
        for (index, result) in join_all(lanes).await.into_iter().flatten() {
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| TaskOutcome {
                index,
                result: slot.unwrap_or_else(|| Err(CANCELLED.to_string())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn double(_: usize, n: &u64) -> impl Future<Output = Result<u64, String>> {
        let n = *n;
        async move {
            tokio::time::sleep(Duration::from_millis(n % 7)).await;
            Ok(n * 2)
        }
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        let items: Vec<u64> = (0..20).collect();
        let outcomes = TaskRunner::new(4).run(&items, double, |_, _| {}).await;

        assert_eq!(outcomes.len(), items.len());
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.index, i);
            assert_eq!(outcome.result, Ok(items[i] * 2));
        }
    }

    #[tokio::test]
    async fn test_result_independent_of_concurrency() {
        let items: Vec<u64> = (0..13).collect();
        let sequential = TaskRunner::new(1).run(&items, double, |_, _| {}).await;
        for concurrency in [2, 5, 13, 50] {
            let parallel = TaskRunner::new(concurrency).run(&items, double, |_, _| {}).await;
            assert_eq!(parallel, sequential);
        }
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_concurrency() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items: Vec<u64> = (0..30).collect();

        TaskRunner::new(3)
            .run(
                &items,
                |_, _| {
                    let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(current, Ordering::SeqCst);
                    let in_flight = &in_flight;
                    async move {
                        tokio::time::sleep(Duration::from_millis(2)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, String>(())
                    }
                },
                |_, _| {},
            )
            .await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_failures_are_captured() {
        let items = vec![1u64, 2, 3, 4];
        let outcomes = TaskRunner::new(2)
            .run(
                &items,
                |_, n| {
                    let n = *n;
                    async move {
                        if n % 2 == 0 {
                            Err(format!("even {}", n))
                        } else {
                            Ok(n)
                        }
                    }
                },
                |_, _| {},
            )
            .await;

        assert_eq!(outcomes[0].result, Ok(1));
        assert_eq!(outcomes[1].result, Err("even 2".to_string()));
        assert_eq!(outcomes[2].result, Ok(3));
        assert_eq!(outcomes[3].result, Err("even 4".to_string()));
    }

    #[tokio::test]
    async fn test_on_success_called_once_per_success() {
        let seen = Mutex::new(Vec::new());
        let items: Vec<u64> = (1..=10).collect();

        TaskRunner::new(4)
            .run(
                &items,
                |_, n| {
                    let n = *n;
                    async move {
                        if n == 5 {
                            Err("boom")
                        } else {
                            Ok(n)
                        }
                    }
                },
                |index, value| seen.lock().unwrap().push((index, *value)),
            )
            .await;

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        let expected: Vec<(usize, u64)> = (1..=10u64)
            .filter(|n| *n != 5)
            .map(|n| (n as usize - 1, n))
            .collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let items: Vec<u64> = Vec::new();
        let outcomes = TaskRunner::new(5).run(&items, double, |_, _| {}).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let runner = TaskRunner::new(0);
        assert_eq!(runner.concurrency(), 1);

        let items = vec![1u64, 2, 3];
        let outcomes = runner.run(&items, double, |_, _| {}).await;
        assert!(outcomes.iter().all(|o| o.is_success()));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();

        let items = vec![1u64, 2, 3];
        let outcomes = TaskRunner::new(2)
            .with_cancellation(token)
            .run(&items, double, |_, _| {})
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes
            .iter()
            .all(|o| o.result == Err(CANCELLED.to_string())));
    }

    #[tokio::test]
    async fn test_cancel_mid_run_stops_claiming() {
        let token = CancellationToken::new();
        let items: Vec<u64> = (0..6).collect();

        let outcomes = TaskRunner::new(1)
            .with_cancellation(token.clone())
            .run(
                &items,
                |index, n| {
                    if index == 2 {
                        token.cancel();
                    }
                    let n = *n;
                    async move { Ok::<_, String>(n) }
                },
                |_, _| {},
            )
            .await;

        assert_eq!(outcomes[0].result, Ok(0));
        assert_eq!(outcomes[1].result, Ok(1));
        // 已领取的任务正常完成
        assert_eq!(outcomes[2].result, Ok(2));
        for outcome in &outcomes[3..] {
            assert_eq!(outcome.result, Err(CANCELLED.to_string()));
        }
    }
}
