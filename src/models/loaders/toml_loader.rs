//! 提示词目录加载器
//!
//! 从 TOML 文件加载维度目录和 SECM 目录，进程启动时调用一次，
//! 加载结果显式传入编排器（不做模块级缓存）。

use crate::error::CatalogError;
use crate::models::catalog::{DimensionCatalog, SecmCatalog, SECM_VARIABLE_COUNT};
use crate::models::unit::{UnitKind, UnitSpec};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// TOML 中的单元条目
#[derive(Debug, Deserialize)]
struct UnitEntry {
    name: String,
    prompt: String,
}

/// dimensions.toml 的文件结构
#[derive(Debug, Deserialize)]
struct DimensionsFile {
    dimensions: Vec<UnitEntry>,
}

/// secm.toml 的文件结构
///
/// 分组结构与原始目录一致：意识形态左/右标记、认知高/低完整性标记。
#[derive(Debug, Deserialize)]
struct SecmFile {
    #[serde(default = "default_k")]
    k: f64,
    #[serde(default)]
    ideological_variables: IdeologicalVariables,
    #[serde(default)]
    epistemic_variables: EpistemicVariables,
}

fn default_k() -> f64 {
    crate::models::catalog::DEFAULT_DAMPING_K
}

#[derive(Debug, Default, Deserialize)]
struct IdeologicalVariables {
    #[serde(default)]
    left_markers: Vec<UnitEntry>,
    #[serde(default)]
    right_markers: Vec<UnitEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct EpistemicVariables {
    #[serde(default)]
    high_integrity: Vec<UnitEntry>,
    #[serde(default)]
    low_integrity: Vec<UnitEntry>,
}

/// 从 TOML 文件加载维度目录
pub async fn load_dimension_catalog(path: &Path) -> Result<DimensionCatalog> {
    let content = read_catalog_file(path).await?;

    let file: DimensionsFile =
        toml::from_str(&content).map_err(|e| CatalogError::TomlParseFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

    if file.dimensions.is_empty() {
        anyhow::bail!("维度目录为空: {}", path.display());
    }

    check_unique_names(file.dimensions.iter().map(|d| d.name.as_str()))?;

    let dimensions = file
        .dimensions
        .into_iter()
        .map(|d| UnitSpec::new(d.name, d.prompt, UnitKind::Dimension))
        .collect();

    Ok(DimensionCatalog { dimensions })
}

/// 从 TOML 文件加载 SECM 目录
///
/// 校验规则沿用原始目录约定：恰好 22 个变量、K 为正数、名称唯一。
/// 变量按 左→右→高→低 的顺序展平。
pub async fn load_secm_catalog(path: &Path) -> Result<SecmCatalog> {
    let content = read_catalog_file(path).await?;

    let file: SecmFile = toml::from_str(&content).map_err(|e| CatalogError::TomlParseFailed {
        path: path.display().to_string(),
        source: Box::new(e),
    })?;

    if file.k <= 0.0 || !file.k.is_finite() {
        return Err(CatalogError::InvalidDamping { value: file.k }.into());
    }

    // 按固定顺序展平四个分组
    let mut entries = Vec::new();
    entries.extend(file.ideological_variables.left_markers);
    entries.extend(file.ideological_variables.right_markers);
    entries.extend(file.epistemic_variables.high_integrity);
    entries.extend(file.epistemic_variables.low_integrity);

    if entries.len() != SECM_VARIABLE_COUNT {
        return Err(CatalogError::VariableCountMismatch {
            expected: SECM_VARIABLE_COUNT,
            found: entries.len(),
        }
        .into());
    }

    check_unique_names(entries.iter().map(|e| e.name.as_str()))?;

    let variables = entries
        .into_iter()
        .map(|e| UnitSpec::new(e.name, e.prompt, UnitKind::Variable))
        .collect();

    Ok(SecmCatalog {
        k: file.k,
        variables,
    })
}

async fn read_catalog_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CatalogError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取目录文件: {}", path.display()))
}

fn check_unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_string()) {
            return Err(CatalogError::DuplicateUnitName {
                name: name.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secm_file_groups_parse_independently() {
        let file: SecmFile = toml::from_str(
            r#"
k = 4.0

[[ideological_variables.left_markers]]
name = "secm_ideol_l1_systemic_naming"
prompt = "p"
"#,
        )
        .unwrap();
        assert_eq!(file.ideological_variables.left_markers.len(), 1);
        assert!(file.epistemic_variables.high_integrity.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = check_unique_names(["a", "b", "a"].into_iter());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let result = load_dimension_catalog(Path::new("no_such_catalog.toml")).await;
        assert!(result.is_err());
        let msg = format!("{}", result.unwrap_err());
        assert!(msg.contains("不存在"));
    }

    #[tokio::test]
    async fn test_load_real_catalogs() {
        // 仓库自带的默认目录必须通过全部校验
        let dims = load_dimension_catalog(Path::new("catalog/dimensions.toml"))
            .await
            .expect("维度目录应该能加载");
        assert_eq!(dims.dimensions.len(), 4);

        let secm = load_secm_catalog(Path::new("catalog/secm.toml"))
            .await
            .expect("SECM 目录应该能加载");
        assert_eq!(secm.variables.len(), 22);
        assert_eq!(secm.k, 4.0);
        assert_eq!(secm.variables[0].name, "secm_ideol_l1_systemic_naming");
    }
}
