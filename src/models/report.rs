use std::collections::HashMap;

use serde::Serialize;

/// 维度评分集
///
/// `overall` 是四个维度的平均值经线性映射（1..7 → -1..1）后的总体偏见分；
/// 过滤后没有任何维度成功时为 None。
#[derive(Debug, Clone, Serialize)]
pub struct DimensionScoreSet {
    /// 各维度分数（1-7）
    pub per_dimension: HashMap<String, f64>,
    /// 总体偏见分（-1..1），无可用维度时为 None
    pub overall: Option<f64>,
}

/// SECM 评分集
///
/// 22 个二元标记经贝叶斯阻尼公式聚合出两个分数，
/// 两者都严格落在 (-1, 1) 开区间内。
#[derive(Debug, Clone, Serialize)]
pub struct SecmScoreSet {
    /// 意识形态分数 (R - L) / (R + L + K)
    pub ideological: f64,
    /// 认知完整性分数 (H - E) / (H + E + K)
    pub epistemic: f64,
    /// 各标记的 0/1 取值
    pub variables: HashMap<String, u8>,
    /// 各标记的理由文本（上游给出时）
    pub reasoning: HashMap<String, String>,
}

/// 单篇文章的完整偏见分析报告
///
/// 维度评分 + SECM 评分的汇总，是本引擎对外暴露的最终产物。
/// 持久化由外部协作方负责。
#[derive(Debug, Clone, Serialize)]
pub struct BiasReport {
    /// 各维度分数（1-7）
    pub scores: HashMap<String, f64>,
    /// 总体偏见分（-1..1）
    pub bias_score: Option<f64>,
    /// SECM 意识形态分数
    pub secm_ideological_score: f64,
    /// SECM 认知完整性分数
    pub secm_epistemic_score: f64,
    /// SECM 各标记取值
    pub secm_variables: HashMap<String, u8>,
    /// SECM 各标记理由
    pub secm_reasoning: HashMap<String, String>,
    /// 使用的模型名称
    pub ai_model: String,
    /// 评估时间
    pub evaluated_at: String,
}
