use std::collections::HashMap;

/// 单元解析结果值
///
/// 两类单元各自对应一种值：
/// - 维度单元 → 经过范围校验的 1-7 分数
/// - 变量单元 → 0/1 标记加自由文本理由
#[derive(Debug, Clone, PartialEq)]
pub enum UnitValue {
    /// 连续分数，已钳制在 [1.0, 7.0]
    Score(f64),
    /// 二元标记，`value` 只会是 0 或 1
    Marker {
        value: u8,
        /// 理由文本，上游未给出 `<reasoning>` 块时为空字符串
        reasoning: String,
    },
}

impl UnitValue {
    /// 取连续分数（非维度单元返回 None）
    pub fn as_score(&self) -> Option<f64> {
        match self {
            UnitValue::Score(v) => Some(*v),
            UnitValue::Marker { .. } => None,
        }
    }

    /// 取二元标记值（非变量单元返回 None）
    pub fn as_marker(&self) -> Option<u8> {
        match self {
            UnitValue::Marker { value, .. } => Some(*value),
            UnitValue::Score(_) => None,
        }
    }
}

/// 单元调用结局
///
/// 每个单元在一次编排中恰好产生一个结局。所有重试都发生在
/// unit_caller 内部，编排器拿到结局后不会再重试。
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    /// 调用并解析成功
    Success(UnitValue),
    /// 重试耗尽后的终止失败（记录原因，不向上抛出）
    Failure {
        reason: String,
    },
}

/// 编排结果
///
/// 每篇文章每个目录调用一次，全部任务完成后不再变化。
/// 进入 `successes` 的值都已通过解析器的范围校验。
#[derive(Debug, Clone, Default)]
pub struct OrchestrationResult {
    /// 成功单元：名称 → 解析值
    pub successes: HashMap<String, UnitValue>,
    /// 失败原因列表，格式 "<单元名>: <原因>"，按目录顺序排列
    pub failure_reasons: Vec<String>,
}

impl OrchestrationResult {
    /// 是否为部分成功（有成功也有失败）
    pub fn is_partial(&self) -> bool {
        !self.successes.is_empty() && !self.failure_reasons.is_empty()
    }

    /// 提取所有连续分数（维度目录使用）
    pub fn score_map(&self) -> HashMap<String, f64> {
        self.successes
            .iter()
            .filter_map(|(name, value)| value.as_score().map(|v| (name.clone(), v)))
            .collect()
    }

    /// 提取所有二元标记值（SECM 目录使用）
    pub fn marker_map(&self) -> HashMap<String, u8> {
        self.successes
            .iter()
            .filter_map(|(name, value)| value.as_marker().map(|v| (name.clone(), v)))
            .collect()
    }

    /// 提取所有非空理由文本（SECM 目录使用）
    pub fn reasoning_map(&self) -> HashMap<String, String> {
        self.successes
            .iter()
            .filter_map(|(name, value)| match value {
                UnitValue::Marker { reasoning, .. } if !reasoning.is_empty() => {
                    Some((name.clone(), reasoning.clone()))
                }
                _ => None,
            })
            .collect()
    }
}
