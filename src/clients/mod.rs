pub mod llm_client;

pub use llm_client::LlmClient;

use async_trait::async_trait;

use crate::error::TransportError;

/// LLM 传输层抽象
///
/// 引擎核心只通过这一个契约依赖上游模型：一次同步语义的调用，
/// 输入提示词和文章正文，返回原始文本或传输错误。
/// 实现必须支持多个任务并发调用（编排器会同时发起几十个请求）。
#[async_trait]
pub trait LlmTransport: Send + Sync {
    /// 调用上游模型，返回原始响应文本
    async fn invoke(&self, prompt: &str, article_text: &str) -> Result<String, TransportError>;
}
