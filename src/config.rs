use std::time::Duration;

use crate::services::unit_caller::RetryPolicy;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 待分析文章存放目录
    pub article_folder: String,
    /// 同时处理的文章数量
    pub max_concurrent_articles: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 目录配置 ---
    pub dimension_catalog_path: String,
    pub secm_catalog_path: String,
    // --- 重试配置 ---
    /// 维度单元最大尝试次数
    pub dimension_max_retries: u32,
    /// 变量单元最大尝试次数
    pub variable_max_retries: u32,
    /// 线性退避基础等待（毫秒）
    pub retry_base_delay_ms: u64,
    /// 过载错误固定等待（毫秒）
    pub overload_delay_ms: u64,
    /// 单元并发上限（None = 不限）
    pub max_concurrent_units: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            article_folder: "articles".to_string(),
            max_concurrent_articles: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            dimension_catalog_path: "catalog/dimensions.toml".to_string(),
            secm_catalog_path: "catalog/secm.toml".to_string(),
            dimension_max_retries: 5,
            variable_max_retries: 3,
            retry_base_delay_ms: 1_000,
            overload_delay_ms: 5_000,
            max_concurrent_units: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            article_folder: std::env::var("ARTICLE_FOLDER").unwrap_or(default.article_folder),
            max_concurrent_articles: std::env::var("MAX_CONCURRENT_ARTICLES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_articles),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            dimension_catalog_path: std::env::var("DIMENSION_CATALOG").unwrap_or(default.dimension_catalog_path),
            secm_catalog_path: std::env::var("SECM_CATALOG").unwrap_or(default.secm_catalog_path),
            dimension_max_retries: std::env::var("DIMENSION_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dimension_max_retries),
            variable_max_retries: std::env::var("VARIABLE_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.variable_max_retries),
            retry_base_delay_ms: std::env::var("RETRY_BASE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_base_delay_ms),
            overload_delay_ms: std::env::var("OVERLOAD_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.overload_delay_ms),
            max_concurrent_units: std::env::var("MAX_CONCURRENT_UNITS").ok().and_then(|v| v.parse::<usize>().ok()).filter(|&n| n > 0),
        }
    }

    /// 维度单元的重试策略
    pub fn dimension_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.dimension_max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            overload_delay: Duration::from_millis(self.overload_delay_ms),
        }
    }

    /// 变量单元的重试策略
    pub fn variable_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.variable_max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            overload_delay: Duration::from_millis(self.overload_delay_ms),
        }
    }
}
