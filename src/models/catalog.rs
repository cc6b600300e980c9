use crate::models::unit::UnitSpec;

/// 维度目录
///
/// 4 个连续维度单元，进程启动时加载一次，显式传入编排器。
#[derive(Debug, Clone)]
pub struct DimensionCatalog {
    pub dimensions: Vec<UnitSpec>,
}

/// SECM 目录
///
/// 22 个二元变量单元（左/右意识形态各 6 个，高/低认知完整性各 5 个），
/// 外加阻尼常数 K。分组成员关系硬编码在 scoring 层，
/// 目录只负责提供有序的单元列表。
#[derive(Debug, Clone)]
pub struct SecmCatalog {
    /// 阻尼常数，必须为正数（默认 4.0）
    pub k: f64,
    /// 全部 22 个变量，按 左→右→高→低 的顺序排列
    pub variables: Vec<UnitSpec>,
}

/// SECM 变量总数（6 + 6 + 5 + 5）
pub const SECM_VARIABLE_COUNT: usize = 22;

/// 默认阻尼常数
pub const DEFAULT_DAMPING_K: f64 = 4.0;
