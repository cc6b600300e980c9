/// 单元类型
///
/// 一个"单元"是一次独立的分类请求：
/// - `Dimension`：连续维度（1-7 分），共 4 个
/// - `Variable`：二元标记（0/1），共 22 个
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// 连续维度单元
    Dimension,
    /// 二元变量单元
    Variable,
}

/// 分类单元
///
/// 不可变数据，由提示词目录提供。`name` 在同一目录内唯一，作为单元标识。
#[derive(Debug, Clone)]
pub struct UnitSpec {
    /// 单元名称（目录内唯一）
    pub name: String,
    /// 提示词模板
    pub prompt: String,
    /// 单元类型
    pub kind: UnitKind,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            kind,
        }
    }
}
