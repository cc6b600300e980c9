//! 评分引擎
//!
//! 两个相互独立的纯算法，消费编排器的成功结果：
//! - 维度平均 + 线性重映射（本模块）
//! - SECM 贝叶斯阻尼矩阵评分（`secm` 子模块）
//!
//! 进入这里的值都已通过解析器的范围校验，算法可以假设
//! 连续分数落在 [1,7]、二元标记只会是 0 或 1。

pub mod secm;

pub use secm::{score_secm, MarkerGroup, MARKER_GROUPS};

use std::collections::HashMap;

use crate::models::report::DimensionScoreSet;

/// 可插拔的评分函数，处理原始维度分数
///
/// 当前实现是恒等透传，作为未来加权公式的扩展点存在。
/// 默认配置下绝不允许改变任何值。
pub fn score_bias(raw_scores: &HashMap<String, f64>) -> HashMap<String, f64> {
    raw_scores.clone()
}

/// 线性地把分数从一个区间映射到另一个区间
///
/// 默认用法：1-7 量表 → -1..1 量表。
/// - 1 → -1（极左 / 最低偏见）
/// - 4 → 0（中立）
/// - 7 → +1（极右 / 最高偏见）
pub fn normalize_score_to_range(
    score: f64,
    from_min: f64,
    from_max: f64,
    to_min: f64,
    to_max: f64,
) -> f64 {
    (score - from_min) / (from_max - from_min) * (to_max - to_min) + to_min
}

/// 聚合维度分数集
///
/// 先过 `score_bias`（默认透传），再取平均并线性映射出总体分。
/// 没有任何可用维度时总体分为 None。
pub fn aggregate_dimensions(raw_scores: &HashMap<String, f64>) -> DimensionScoreSet {
    let per_dimension = score_bias(raw_scores);

    let overall = if per_dimension.is_empty() {
        None
    } else {
        let sum: f64 = per_dimension.values().sum();
        let avg = sum / per_dimension.len() as f64;
        Some(normalize_score_to_range(avg, 1.0, 7.0, -1.0, 1.0))
    };

    DimensionScoreSet {
        per_dimension,
        overall,
    }
}
