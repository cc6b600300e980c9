//! 批量文章处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量文章的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、加载提示词目录、创建 LLM 客户端
//! 2. **批量加载**：扫描并加载所有待分析的文章（`.txt` 文件）
//! 3. **并发控制**：使用 Semaphore 限制同时分析的文章数量
//! 4. **分批处理**：将文章分批处理，每批完成后再开始下一批
//! 5. **结果落盘**：把每篇文章的报告以 JSON 形式追加到输出文件
//! 6. **全局统计**：汇总所有文章的处理结果

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::{LlmClient, LlmTransport};
use crate::config::Config;
use crate::models::loaders::{load_dimension_catalog, load_secm_catalog};
use crate::models::report::BiasReport;
use crate::utils::logging;
use crate::workflow::AnalysisFlow;

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<AnalysisFlow>,
}

/// 待分析的文章
#[derive(Debug, Clone)]
struct ArticleFile {
    name: String,
    text: String,
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化输出文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(config.max_concurrent_articles, &config.llm_model_name);

        // 加载提示词目录（进程内只加载一次，显式注入流程）
        let dimensions = Arc::new(
            load_dimension_catalog(Path::new(&config.dimension_catalog_path)).await?,
        );
        let secm = Arc::new(load_secm_catalog(Path::new(&config.secm_catalog_path)).await?);
        info!(
            "✓ 目录加载完成: {} 个维度, {} 个 SECM 变量 (K = {})",
            dimensions.dimensions.len(),
            secm.variables.len(),
            secm.k
        );

        let transport: Arc<dyn LlmTransport> = Arc::new(LlmClient::new(&config));
        let flow = Arc::new(AnalysisFlow::new(&config, transport, dimensions, secm));

        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let articles = self.load_articles().await?;

        if articles.is_empty() {
            warn!("⚠️ 没有找到待分析的文章，程序结束");
            return Ok(());
        }

        let total = articles.len();
        logging::log_articles_loaded(total, self.config.max_concurrent_articles);

        let stats = self.process_all_articles(articles).await?;

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(())
    }

    /// 扫描文章目录，加载所有 .txt 文件
    async fn load_articles(&self) -> Result<Vec<ArticleFile>> {
        info!("\n📁 正在扫描待分析的文章...");

        let folder = PathBuf::from(&self.config.article_folder);
        if !folder.exists() {
            anyhow::bail!("文章目录不存在: {}", self.config.article_folder);
        }

        let mut articles = Vec::new();
        let mut entries = fs::read_dir(&folder)
            .await
            .with_context(|| format!("无法读取文章目录: {}", self.config.article_folder))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("txt") {
                let name = path
                    .file_stem()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();

                match fs::read_to_string(&path).await {
                    Ok(text) if !text.trim().is_empty() => {
                        info!("正在加载: {} ({} 字符)", name, text.len());
                        articles.push(ArticleFile { name, text });
                    }
                    Ok(_) => {
                        warn!("⚠️ 文件为空，已跳过: {}", path.display());
                    }
                    Err(e) => {
                        warn!("加载文件失败 {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(articles)
    }

    /// 处理所有文章
    async fn process_all_articles(&self, articles: Vec<ArticleFile>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_articles.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = articles.len();
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };
        for (batch_index, batch) in articles.chunks(batch_size).enumerate() {
            let batch_start = batch_index * batch_size;

            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[ArticleFile],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, article) in batch.iter().enumerate() {
            let article_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = Arc::clone(&self.flow);
            let article = article.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let report = flow.run(&article.text, article_index).await;
                (article.name, report)
            });
            batch_handles.push((article_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for (article_index, handle) in batch_handles {
            match handle.await {
                Ok((name, Ok(report))) => {
                    if let Err(e) = self.append_report(&name, &report).await {
                        error!("[文章 {}] 报告写入失败: {}", article_index, e);
                    }
                    result.success += 1;
                }
                Ok((name, Err(e))) => {
                    error!("[文章 {}] ❌ 分析失败 ({}): {}", article_index, name, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[文章 {}] 任务执行失败: {}", article_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }

    /// 把报告以 JSON 形式追加到输出文件
    async fn append_report(&self, name: &str, report: &BiasReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let entry = format!("### {}\n{}\n\n", name, json);

        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.config.output_log_file)
            .await
            .with_context(|| format!("无法打开输出文件: {}", self.config.output_log_file))?;
        file.write_all(entry.as_bytes()).await?;

        Ok(())
    }
}
