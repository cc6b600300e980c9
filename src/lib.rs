//! # Article Bias Analysis
//!
//! 一个用 LLM 做文章政治/认知偏见分析的 Rust 引擎
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - LLM 传输层，只暴露 `invoke` 能力
//! - `LlmTransport` - 传输抽象，`LlmClient` 是生产实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个单元
//! - `response_parser` - 把自然语言响应解析成有界类型值
//! - `unit_caller` - 单个单元的调用与两档重试
//!
//! ### ③ 流程层（Workflow / Scoring）
//! - `workflow/` - 定义"一篇文章"的完整分析流程
//! - `scoring/` - 两个纯评分算法（维度平均、SECM 阻尼矩阵）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 单元级扇出/扇入与部分失败聚合
//! - `app` - 批量文章处理器，管理资源和并发
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod scoring;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{LlmClient, LlmTransport};
pub use config::Config;
pub use error::{AppError, AppResult, CatalogError, ParseError, TransportError};
pub use models::{
    BiasReport, DimensionCatalog, DimensionScoreSet, OrchestrationResult, SecmCatalog,
    SecmScoreSet, UnitKind, UnitOutcome, UnitSpec, UnitValue,
};
pub use orchestrator::{run_all, AggregationPolicy, OrchestratorOptions};
pub use scoring::{aggregate_dimensions, normalize_score_to_range, score_bias, score_secm};
pub use services::{call_unit, parse_binary, parse_continuous, RetryPolicy};
pub use workflow::AnalysisFlow;
