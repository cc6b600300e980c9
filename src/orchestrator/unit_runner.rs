//! 单元编排器 - 编排层
//!
//! ## 职责
//!
//! 给定一篇文章和一个目录，为每个单元启动一个并发任务，
//! 等全部任务结束后按聚合策略产出结果。
//!
//! ## 设计特点
//!
//! - **扇出**：每个单元一个 `tokio::spawn` 任务，默认不设并发上限；
//!   `max_concurrent_units` 是可选的 Semaphore 硬化开关
//! - **扇入**：等待所有任务完成，不因单个失败提前取消兄弟任务——
//!   用完整信息换延迟
//! - **部分失败聚合**：默认韧性策略，只要有一个单元成功就返回结果，
//!   失败只记录为诊断；全部失败才向调用方抛出终止错误
//! - 本层不做重试，重试全部发生在 unit_caller 内部

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::clients::LlmTransport;
use crate::error::{AppError, AppResult};
use crate::models::outcome::{OrchestrationResult, UnitOutcome};
use crate::models::unit::UnitSpec;
use crate::services::unit_caller::{call_unit, RetryPolicy};

/// 聚合策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPolicy {
    /// 韧性模式（默认）：任一单元成功即返回结果，失败只记录
    Resilient,
    /// 原子模式：任一单元失败即整体失败
    Atomic,
}

/// 编排器选项
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// 聚合策略
    pub aggregation: AggregationPolicy,
    /// 并发上限（None = 不限，与参考行为一致）
    pub max_concurrent_units: Option<usize>,
    /// 单元重试策略
    pub retry: RetryPolicy,
}

impl OrchestratorOptions {
    /// 维度目录的默认选项
    pub fn for_dimensions() -> Self {
        Self {
            aggregation: AggregationPolicy::Resilient,
            max_concurrent_units: None,
            retry: RetryPolicy::for_dimension(),
        }
    }

    /// SECM 变量目录的默认选项
    pub fn for_variables() -> Self {
        Self {
            aggregation: AggregationPolicy::Resilient,
            max_concurrent_units: None,
            retry: RetryPolicy::for_variable(),
        }
    }

    /// 设置并发上限
    pub fn with_concurrency_cap(mut self, cap: Option<usize>) -> Self {
        self.max_concurrent_units = cap;
        self
    }

    /// 设置聚合策略
    pub fn with_aggregation(mut self, policy: AggregationPolicy) -> Self {
        self.aggregation = policy;
        self
    }
}

/// 对目录中的每个单元并发调用，等待全部完成后聚合
///
/// 成功单元进入 `successes`，失败单元按目录顺序记入
/// `failure_reasons`（格式 "<单元名>: <原因>"）。
///
/// 韧性策略下只有**全部**单元失败才返回 `AllUnitsFailed`；
/// 原子策略下任一失败即返回该错误（原因列表仍然完整）。
pub async fn run_all(
    transport: Arc<dyn LlmTransport>,
    article_text: &str,
    catalog: &[UnitSpec],
    options: &OrchestratorOptions,
) -> AppResult<OrchestrationResult> {
    info!("开始编排 {} 个分类单元", catalog.len());

    let semaphore = options
        .max_concurrent_units
        .map(|cap| Arc::new(Semaphore::new(cap)));
    let article: Arc<str> = Arc::from(article_text);

    // ========== 扇出：每个单元一个并发任务 ==========
    let mut handles = Vec::with_capacity(catalog.len());
    for unit in catalog {
        let transport = Arc::clone(&transport);
        let article = Arc::clone(&article);
        let unit = unit.clone();
        let retry = options.retry.clone();
        let semaphore = semaphore.clone();

        handles.push(tokio::spawn(async move {
            // 并发上限开启时，任务先取许可再调用
            let _permit = match &semaphore {
                Some(sem) => match Arc::clone(sem).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(e) => {
                        return UnitOutcome::Failure {
                            reason: format!("并发许可获取失败: {}", e),
                        }
                    }
                },
                None => None,
            };

            call_unit(transport.as_ref(), &article, &unit, &retry).await
        }));
    }

    // ========== 扇入：等待全部任务完成 ==========
    let joined = join_all(handles).await;

    let mut result = OrchestrationResult::default();
    for (unit, join_result) in catalog.iter().zip(joined) {
        match join_result {
            Ok(UnitOutcome::Success(value)) => {
                result.successes.insert(unit.name.clone(), value);
            }
            Ok(UnitOutcome::Failure { reason }) => {
                result
                    .failure_reasons
                    .push(format!("{}: {}", unit.name, reason));
            }
            Err(e) => {
                result
                    .failure_reasons
                    .push(format!("{}: 任务执行失败: {}", unit.name, e));
            }
        }
    }

    // ========== 聚合策略 ==========
    if result.successes.is_empty() {
        return Err(AppError::AllUnitsFailed {
            reasons: result.failure_reasons,
        });
    }

    if options.aggregation == AggregationPolicy::Atomic && !result.failure_reasons.is_empty() {
        return Err(AppError::AllUnitsFailed {
            reasons: result.failure_reasons,
        });
    }

    // 韧性模式：与成功并存的失败不上抛，只作为诊断输出
    for reason in &result.failure_reasons {
        warn!("⚠️ 单元失败（已跳过）: {}", reason);
    }
    info!(
        "✓ 编排完成: 成功 {}/{}",
        result.successes.len(),
        catalog.len()
    );

    Ok(result)
}
