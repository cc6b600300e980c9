//! 文章分析流程 - 流程层
//!
//! 核心职责：定义"一篇文章"的完整分析流程
//!
//! 流程顺序：
//! 1. 维度评分（4 个连续单元）→ 平均 → 线性映射出总体偏见分
//! 2. SECM 评分（22 个二元单元）→ 贝叶斯阻尼矩阵分数
//! 3. 汇总为一份 `BiasReport`
//!
//! 两个评分通道各自容忍部分失败；只有某个通道全部单元失败时
//! 整篇文章才算分析失败。

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::clients::LlmTransport;
use crate::config::Config;
use crate::models::catalog::{DimensionCatalog, SecmCatalog};
use crate::models::report::BiasReport;
use crate::orchestrator::{run_all, OrchestratorOptions};
use crate::scoring::{aggregate_dimensions, score_secm};

/// 文章分析流程
///
/// - 编排维度通道和 SECM 通道的先后顺序
/// - 不持有任何稀缺资源，传输层通过 `Arc` 注入
/// - 目录在进程启动时加载一次，显式传入
pub struct AnalysisFlow {
    transport: Arc<dyn LlmTransport>,
    dimensions: Arc<DimensionCatalog>,
    secm: Arc<SecmCatalog>,
    dimension_options: OrchestratorOptions,
    variable_options: OrchestratorOptions,
    model_name: String,
    verbose_logging: bool,
}

impl AnalysisFlow {
    /// 创建新的分析流程
    pub fn new(
        config: &Config,
        transport: Arc<dyn LlmTransport>,
        dimensions: Arc<DimensionCatalog>,
        secm: Arc<SecmCatalog>,
    ) -> Self {
        let mut dimension_options =
            OrchestratorOptions::for_dimensions().with_concurrency_cap(config.max_concurrent_units);
        dimension_options.retry = config.dimension_retry_policy();

        let mut variable_options =
            OrchestratorOptions::for_variables().with_concurrency_cap(config.max_concurrent_units);
        variable_options.retry = config.variable_retry_policy();

        Self {
            transport,
            dimensions,
            secm,
            dimension_options,
            variable_options,
            model_name: config.llm_model_name.clone(),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 分析一篇文章，产出完整偏见报告
    pub async fn run(&self, article_text: &str, article_index: usize) -> Result<BiasReport> {
        if article_text.trim().is_empty() {
            anyhow::bail!("文章正文为空，无法分析");
        }

        // ========== 通道 1: 维度评分 ==========
        info!(
            "[文章 {}] 🔍 开始维度评分（{} 个单元）...",
            article_index,
            self.dimensions.dimensions.len()
        );

        let dimension_result = run_all(
            Arc::clone(&self.transport),
            article_text,
            &self.dimensions.dimensions,
            &self.dimension_options,
        )
        .await?;

        if dimension_result.is_partial() {
            warn!(
                "[文章 {}] ⚠️ 维度评分部分成功: {}/{}",
                article_index,
                dimension_result.successes.len(),
                self.dimensions.dimensions.len()
            );
        }

        let score_set = aggregate_dimensions(&dimension_result.score_map());

        if self.verbose_logging {
            for (name, score) in &score_set.per_dimension {
                info!("[文章 {}]   {} = {:.1}", article_index, name, score);
            }
        }
        info!(
            "[文章 {}] ✓ 维度评分完成，总体偏见分: {:?}",
            article_index, score_set.overall
        );

        // ========== 通道 2: SECM 评分 ==========
        info!(
            "[文章 {}] 🔍 开始 SECM 评分（{} 个单元）...",
            article_index,
            self.secm.variables.len()
        );

        let secm_result = run_all(
            Arc::clone(&self.transport),
            article_text,
            &self.secm.variables,
            &self.variable_options,
        )
        .await?;

        if secm_result.is_partial() {
            warn!(
                "[文章 {}] ⚠️ SECM 评分部分成功: {}/{}",
                article_index,
                secm_result.successes.len(),
                self.secm.variables.len()
            );
        }

        let secm_set = score_secm(
            &secm_result.marker_map(),
            &secm_result.reasoning_map(),
            self.secm.k,
        );

        info!(
            "[文章 {}] ✓ SECM 评分完成: 意识形态 {:.3}, 认知 {:.3}",
            article_index, secm_set.ideological, secm_set.epistemic
        );

        // ========== 汇总报告 ==========
        Ok(BiasReport {
            scores: score_set.per_dimension,
            bias_score: score_set.overall,
            secm_ideological_score: secm_set.ideological,
            secm_epistemic_score: secm_set.epistemic,
            secm_variables: secm_set.variables,
            secm_reasoning: secm_set.reasoning,
            ai_model: self.model_name.clone(),
            evaluated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}
