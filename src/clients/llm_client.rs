//! LLM API 客户端
//!
//! `LlmTransport` 的生产实现，封装所有与 LLM API 相关的调用逻辑。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::LlmTransport;
use crate::config::Config;
use crate::error::TransportError;

/// LLM 客户端
///
/// 内部的 `Client` 可安全地被多个并发任务共享，
/// 满足编排器对传输层的并发要求。
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            // 低温度保证分类输出稳定；上限放宽到 2000 token，
            // 保证带 <reasoning> 块的响应不会被截断
            temperature: 0.1,
            max_tokens: 2000,
        }
    }

    /// 创建自定义模型的 LLM 客户端
    pub fn with_model(config: &Config, model_name: impl Into<String>) -> Self {
        let mut client = Self::new(config);
        client.model_name = model_name.into();
        client
    }

    /// 获取模型名称
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 把第三方错误分类为传输错误
    ///
    /// 上游过载（503 + overloaded/unavailable 签名）单独归类，
    /// unit_caller 对这类错误采用固定长等待而不是线性退避。
    fn classify_error(&self, err: async_openai::error::OpenAIError) -> TransportError {
        let message = err.to_string();
        let lower = message.to_lowercase();
        if lower.contains("503") && (lower.contains("overloaded") || lower.contains("unavailable"))
        {
            return TransportError::Overloaded { message };
        }
        TransportError::api_call_failed(&self.model_name, err)
    }
}

#[async_trait]
impl LlmTransport for LlmClient {
    /// 调用上游模型，返回原始响应文本
    ///
    /// 提示词和文章正文拼成一条用户消息发送，与上游无状态交互，
    /// 每次调用相互独立。
    async fn invoke(&self, prompt: &str, article_text: &str) -> Result<String, TransportError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("文章长度: {} 字符", article_text.len());

        let user_message = format!("{}\n\nArticle text:\n{}", prompt, article_text);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| TransportError::api_call_failed(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| TransportError::api_call_failed(&self.model_name, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            self.classify_error(e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| TransportError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}
