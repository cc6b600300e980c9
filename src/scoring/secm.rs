//! SECM 贝叶斯阻尼矩阵评分
//!
//! 22 个二元标记按固定分组求和，再经带阻尼常数的有符号差公式
//! 聚合为两个分数：
//!
//! - `ideological = (R - L) / (R + L + K)`
//! - `epistemic   = (H - E) / (H + E + K)`
//!
//! K > 0 保证结果严格落在 (-1, 1) 开区间：单个孤立标记只产生
//! 温和信号（R=1, L=0, K=4 → 0.20），只有持续的单边证据才能把
//! 分数推向极端。这个阻尼语义是本评分器区别于朴素比例
//! `(R-L)/(R+L)` 的核心设计，必须精确保留。

use std::collections::HashMap;

use phf::phf_map;

use crate::models::report::SecmScoreSet;

/// 标记分组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerGroup {
    /// 左倾意识形态标记（6 个）
    Left,
    /// 右倾意识形态标记（6 个）
    Right,
    /// 高认知完整性标记（5 个）
    HighIntegrity,
    /// 低认知完整性标记（5 个）
    LowIntegrity,
}

/// 标记名 → 分组的固定成员表
///
/// 分组成员关系是评分语义的一部分，硬编码在这里而不是目录里。
pub static MARKER_GROUPS: phf::Map<&'static str, MarkerGroup> = phf_map! {
    // 意识形态：左倾标记
    "secm_ideol_l1_systemic_naming" => MarkerGroup::Left,
    "secm_ideol_l2_power_gap_lexicon" => MarkerGroup::Left,
    "secm_ideol_l3_elite_culpability" => MarkerGroup::Left,
    "secm_ideol_l4_resource_redistribution" => MarkerGroup::Left,
    "secm_ideol_l5_change_as_justice" => MarkerGroup::Left,
    "secm_ideol_l6_care_harm" => MarkerGroup::Left,
    // 意识形态：右倾标记
    "secm_ideol_r1_agentic_culpability" => MarkerGroup::Right,
    "secm_ideol_r2_order_lexicon" => MarkerGroup::Right,
    "secm_ideol_r3_institutional_defense" => MarkerGroup::Right,
    "secm_ideol_r4_meritocratic_defense" => MarkerGroup::Right,
    "secm_ideol_r5_change_as_threat" => MarkerGroup::Right,
    "secm_ideol_r6_sanctity_degradation" => MarkerGroup::Right,
    // 认知：高完整性标记
    "secm_epist_h1_primary_documentation" => MarkerGroup::HighIntegrity,
    "secm_epist_h2_adversarial_sourcing" => MarkerGroup::HighIntegrity,
    "secm_epist_h3_specific_attribution" => MarkerGroup::HighIntegrity,
    "secm_epist_h4_data_contextualization" => MarkerGroup::HighIntegrity,
    "secm_epist_h5_methodological_transparency" => MarkerGroup::HighIntegrity,
    // 认知：低完整性标记
    "secm_epist_e1_emotive_adjectives" => MarkerGroup::LowIntegrity,
    "secm_epist_e2_labeling_othering" => MarkerGroup::LowIntegrity,
    "secm_epist_e3_causal_certainty" => MarkerGroup::LowIntegrity,
    "secm_epist_e4_imperative_direct_address" => MarkerGroup::LowIntegrity,
    "secm_epist_e5_motivated_reasoning" => MarkerGroup::LowIntegrity,
};

/// 计算 SECM 评分集
///
/// 纯函数：相同输入必得相同输出。输入缺失的标记按"未观测"
/// 处理，贡献 0，不算错误；不在成员表里的名字直接忽略。
pub fn score_secm(
    variables: &HashMap<String, u8>,
    reasoning: &HashMap<String, String>,
    k: f64,
) -> SecmScoreSet {
    let mut left = 0u32;
    let mut right = 0u32;
    let mut high = 0u32;
    let mut low = 0u32;

    for (name, value) in variables {
        let value = u32::from(*value);
        match MARKER_GROUPS.get(name.as_str()) {
            Some(MarkerGroup::Left) => left += value,
            Some(MarkerGroup::Right) => right += value,
            Some(MarkerGroup::HighIntegrity) => high += value,
            Some(MarkerGroup::LowIntegrity) => low += value,
            None => {}
        }
    }

    let ideological = damped_signed_difference(right, left, k);
    let epistemic = damped_signed_difference(high, low, k);

    SecmScoreSet {
        ideological,
        epistemic,
        variables: variables.clone(),
        reasoning: reasoning.clone(),
    }
}

/// 带阻尼的有符号差：(pos - neg) / (pos + neg + k)
fn damped_signed_difference(pos: u32, neg: u32, k: f64) -> f64 {
    (f64::from(pos) - f64::from(neg)) / (f64::from(pos) + f64::from(neg) + k)
}
