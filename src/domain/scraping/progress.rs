//! 进度估算
//!
//! 根据停止条件估算 counter 可达到的最大值，把当前 counter 换算为 0-100 的百分比

use super::condition::{BinaryOp, Expr, StopCondition};

/// 无法识别停止条件时使用的保守上限
pub const FALLBACK_MAX_ITERATIONS: u32 = 1000;

/// 估算最大迭代次数
///
/// 识别的形式（顶层比较，或顶层 `&&` 链中第一个匹配项）:
/// - `counter < N`  -> N - 1
/// - `counter <= N` -> N
/// - `counter == N` -> N
///
/// 其他形式（`>`、`>=`、`!=`、无数字字面量、语法错误）返回 `None`。
/// 结果至少为 1。
pub fn estimate_max(stop_condition: &str) -> Option<u32> {
    let condition = StopCondition::parse(stop_condition).ok()?;
    estimate_from_expr(condition.expr())
}

fn estimate_from_expr(expr: &Expr) -> Option<u32> {
    match expr {
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            estimate_from_expr(lhs).or_else(|| estimate_from_expr(rhs))
        }
        Expr::Binary(op, lhs, rhs) => match (lhs.as_ref(), rhs.as_ref()) {
            (Expr::Counter, Expr::Int(n)) => {
                let max = match op {
                    BinaryOp::Lt => n.checked_sub(1)?,
                    BinaryOp::Le | BinaryOp::Eq => *n,
                    _ => return None,
                };
                Some(u32::try_from(max.max(1)).unwrap_or(u32::MAX))
            }
            _ => None,
        },
        _ => None,
    }
}

/// 计算进度百分比，结果在 [0, 100]
pub fn percent(counter: u32, stop_condition: &str) -> f64 {
    let max = estimate_max(stop_condition).unwrap_or(FALLBACK_MAX_ITERATIONS);
    (f64::from(counter) * 100.0 / f64::from(max)).min(100.0)
}
