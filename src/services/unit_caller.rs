//! 单元调用器 - 业务能力层
//!
//! 负责"调用一个分类单元"这一件事：调用传输层、解析响应、
//! 失败时按两档策略重试。只处理单个单元，不关心兄弟单元，
//! 不关心编排顺序。
//!
//! ## 重试策略
//!
//! - **过载错误**（类型化的 `Overloaded`，或错误文本同时包含 "503" 和
//!   "overloaded"/"unavailable"）：固定等待 `overload_delay` 后重试
//! - **一般错误**（其余传输错误和解析错误）：线性退避，
//!   第 n 次失败后等待 `base_delay * (n + 1)`
//!
//! 重试耗尽后返回终止性的 `Failure`，由编排器记录而不是抛出。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::clients::LlmTransport;
use crate::error::{AppError, AppResult, TransportError};
use crate::models::unit::{UnitKind, UnitSpec};
use crate::models::outcome::{UnitOutcome, UnitValue};
use crate::services::response_parser::{parse_binary, parse_continuous};

/// 单元重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 线性退避的基础等待
    pub base_delay: Duration,
    /// 过载错误的固定等待
    pub overload_delay: Duration,
}

impl RetryPolicy {
    /// 维度单元默认策略：5 次尝试
    pub fn for_dimension() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            overload_delay: Duration::from_secs(5),
        }
    }

    /// 变量单元默认策略：3 次尝试
    pub fn for_variable() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            overload_delay: Duration::from_secs(5),
        }
    }

    /// 第 `attempt_index` 次失败后的线性退避等待（0-based）
    pub fn generic_delay(&self, attempt_index: u32) -> Duration {
        self.base_delay * (attempt_index + 1)
    }
}

/// 调用一个分类单元，重试耗尽后返回终止结局
///
/// 重试完全局限在本单元内部，严格串行，不影响兄弟单元。
pub async fn call_unit(
    transport: &dyn LlmTransport,
    article_text: &str,
    unit: &UnitSpec,
    policy: &RetryPolicy,
) -> UnitOutcome {
    let mut last_error = String::new();

    for attempt in 0..policy.max_attempts {
        match invoke_and_parse(transport, article_text, unit).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("[单元 {}] 第 {} 次尝试成功", unit.name, attempt + 1);
                }
                return UnitOutcome::Success(value);
            }
            Err(err) => {
                let overload = is_overload(&err);
                last_error = err.to_string();
                warn!(
                    "[单元 {}] 第 {}/{} 次尝试失败{}: {}",
                    unit.name,
                    attempt + 1,
                    policy.max_attempts,
                    if overload { "（过载）" } else { "" },
                    last_error
                );

                if attempt + 1 < policy.max_attempts {
                    let delay = if overload {
                        policy.overload_delay
                    } else {
                        policy.generic_delay(attempt)
                    };
                    debug!("[单元 {}] 等待 {:?} 后重试", unit.name, delay);
                    sleep(delay).await;
                }
            }
        }
    }

    UnitOutcome::Failure { reason: last_error }
}

/// 单次调用：传输 + 按单元类型解析
async fn invoke_and_parse(
    transport: &dyn LlmTransport,
    article_text: &str,
    unit: &UnitSpec,
) -> AppResult<UnitValue> {
    let raw = transport.invoke(&unit.prompt, article_text).await?;

    match unit.kind {
        UnitKind::Dimension => {
            let score = parse_continuous(&raw)?;
            Ok(UnitValue::Score(score))
        }
        UnitKind::Variable => {
            let (value, reasoning) = parse_binary(&raw)?;
            Ok(UnitValue::Marker { value, reasoning })
        }
    }
}

/// 判断是否为过载错误
///
/// 优先看类型化的 `Overloaded` 变体；对包装过的第三方错误退回到
/// 错误文本匹配（同时包含 "503" 和 "overloaded"/"unavailable"）。
fn is_overload(err: &AppError) -> bool {
    if matches!(
        err,
        AppError::Transport(TransportError::Overloaded { .. })
    ) {
        return true;
    }

    let text = err.to_string().to_lowercase();
    text.contains("503") && (text.contains("overloaded") || text.contains("unavailable"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 按脚本依次返回响应的测试传输
    struct ScriptedTransport {
        responses: Mutex<Vec<Result<String, TransportError>>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<String, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LlmTransport for ScriptedTransport {
        async fn invoke(&self, _prompt: &str, _article_text: &str) -> Result<String, TransportError> {
            self.responses
                .lock()
                .unwrap()
                .remove(0)
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            overload_delay: Duration::from_millis(1),
        }
    }

    fn dimension_unit() -> UnitSpec {
        UnitSpec::new("partisan_bias", "rate the partisan lean", UnitKind::Dimension)
    }

    fn variable_unit() -> UnitSpec {
        UnitSpec::new(
            "secm_epist_e1_emotive_adjectives",
            "is the marker present",
            UnitKind::Variable,
        )
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let transport = ScriptedTransport::new(vec![Ok("5".to_string())]);
        let outcome = call_unit(&transport, "text", &dimension_unit(), &fast_policy(3)).await;

        match outcome {
            UnitOutcome::Success(UnitValue::Score(v)) => assert_eq!(v, 5.0),
            other => panic!("期望成功, 实际: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_parse_failure_recovered_by_retry() {
        // 第一次返回乱码（解析失败），第二次返回可解析文本
        let transport = ScriptedTransport::new(vec![
            Ok("garbage".to_string()),
            Ok("<answer>1</answer>".to_string()),
        ]);
        let outcome = call_unit(&transport, "text", &variable_unit(), &fast_policy(3)).await;

        match outcome {
            UnitOutcome::Success(UnitValue::Marker { value, .. }) => assert_eq!(value, 1),
            other => panic!("期望成功, 实际: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retries_exhausted_reports_last_error() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::EmptyContent {
                model: "m1".to_string(),
            }),
            Err(TransportError::EmptyContent {
                model: "m2".to_string(),
            }),
        ]);
        let outcome = call_unit(&transport, "text", &dimension_unit(), &fast_policy(2)).await;

        match outcome {
            UnitOutcome::Failure { reason } => {
                // 报告的是最后一次错误
                assert!(reason.contains("m2"), "实际原因: {}", reason);
            }
            other => panic!("期望失败, 实际: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_overload_then_success() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Overloaded {
                message: "503 service overloaded".to_string(),
            }),
            Ok("4".to_string()),
        ]);
        let outcome = call_unit(&transport, "text", &dimension_unit(), &fast_policy(3)).await;
        assert!(matches!(outcome, UnitOutcome::Success(UnitValue::Score(v)) if v == 4.0));
    }

    #[test]
    fn test_is_overload_typed_variant() {
        let err = AppError::Transport(TransportError::Overloaded {
            message: "busy".to_string(),
        });
        assert!(is_overload(&err));
    }

    #[test]
    fn test_is_overload_by_message_text() {
        let err = AppError::Other("upstream returned 503: model OVERLOADED".to_string());
        assert!(is_overload(&err));

        let err = AppError::Other("503 service unavailable".to_string());
        assert!(is_overload(&err));

        // 只有 503 没有过载签名，按一般错误处理
        let err = AppError::Other("error 503".to_string());
        assert!(!is_overload(&err));

        let err = AppError::Other("connection reset".to_string());
        assert!(!is_overload(&err));
    }

    #[test]
    fn test_generic_delay_is_linear() {
        let policy = RetryPolicy::for_dimension();
        assert_eq!(policy.generic_delay(0), Duration::from_secs(1));
        assert_eq!(policy.generic_delay(1), Duration::from_secs(2));
        assert_eq!(policy.generic_delay(2), Duration::from_secs(3));
    }

    #[test]
    fn test_call_unit_blocking_smoke() {
        // tokio_test 适合在同步测试里驱动单个 future
        let transport = ScriptedTransport::new(vec![Ok("seven".to_string())]);
        let outcome = tokio_test::block_on(call_unit(
            &transport,
            "text",
            &dimension_unit(),
            &fast_policy(1),
        ));
        assert!(matches!(outcome, UnitOutcome::Success(UnitValue::Score(v)) if v == 7.0));
    }
}
