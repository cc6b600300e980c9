use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// LLM 响应解析错误
    Parse(ParseError),
    /// LLM 传输层错误
    Transport(TransportError),
    /// 提示词目录错误
    Catalog(CatalogError),
    /// 所有单元全部失败（编排层的终止错误）
    AllUnitsFailed {
        reasons: Vec<String>,
    },
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Parse(e) => write!(f, "解析错误: {}", e),
            AppError::Transport(e) => write!(f, "传输错误: {}", e),
            AppError::Catalog(e) => write!(f, "目录错误: {}", e),
            AppError::AllUnitsFailed { reasons } => {
                write!(f, "所有分类单元均失败: {}", reasons.join("; "))
            }
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Parse(e) => Some(e),
            AppError::Transport(e) => Some(e),
            AppError::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

/// LLM 响应解析错误
///
/// 上游模型返回的是不受约束的自然语言，解析失败是可恢复错误：
/// 重新调用同一个单元可能得到可解析的文本。
#[derive(Debug)]
pub enum ParseError {
    /// 响应为空
    EmptyResponse,
    /// 无法从响应中提取 1-7 分数
    NoScore {
        response: String,
    },
    /// `<answer>` 标签存在但内容无法解析
    UnparseableAnswerTag {
        inner: String,
    },
    /// 无法从响应中提取二元答案
    NoBinaryAnswer {
        response: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyResponse => write!(f, "LLM 返回内容为空"),
            ParseError::NoScore { response } => {
                write!(f, "无法从响应中提取分数: {}", response)
            }
            ParseError::UnparseableAnswerTag { inner } => {
                write!(f, "answer 标签内容无法解析: {}", inner)
            }
            ParseError::NoBinaryAnswer { response } => {
                write!(f, "无法从响应中提取二元答案: {}", response)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// LLM 传输层错误
///
/// `Overloaded` 是类型化的过载分类：重试时使用固定的较长等待，
/// 而不是线性退避（见 unit_caller 的分类逻辑）。
#[derive(Debug)]
pub enum TransportError {
    /// 上游容量过载（503 overloaded / unavailable）
    Overloaded {
        message: String,
    },
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyContent {
        model: String,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Overloaded { message } => {
                write!(f, "LLM 服务过载: {}", message)
            }
            TransportError::ApiCallFailed { model, source } => {
                write!(f, "LLM API 调用失败 (模型: {}): {}", model, source)
            }
            TransportError::EmptyContent { model } => {
                write!(f, "LLM 返回内容为空 (模型: {})", model)
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 提示词目录错误
#[derive(Debug)]
pub enum CatalogError {
    /// 目录文件不存在
    NotFound {
        path: String,
    },
    /// 读取目录文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// SECM 变量数量不符（必须恰好 22 个）
    VariableCountMismatch {
        expected: usize,
        found: usize,
    },
    /// 阻尼常数 K 必须为正数
    InvalidDamping {
        value: f64,
    },
    /// 单元名称重复
    DuplicateUnitName {
        name: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NotFound { path } => write!(f, "目录文件不存在: {}", path),
            CatalogError::ReadFailed { path, source } => {
                write!(f, "读取目录文件失败 ({}): {}", path, source)
            }
            CatalogError::TomlParseFailed { path, source } => {
                write!(f, "TOML 解析失败 ({}): {}", path, source)
            }
            CatalogError::VariableCountMismatch { expected, found } => {
                write!(f, "SECM 变量数量不符: 期望 {} 个，实际 {} 个", expected, found)
            }
            CatalogError::InvalidDamping { value } => {
                write!(f, "阻尼常数 K 必须为正数，实际为 {}", value)
            }
            CatalogError::DuplicateUnitName { name } => {
                write!(f, "单元名称重复: {}", name)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::ReadFailed { source, .. }
            | CatalogError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::Parse(err)
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        AppError::Transport(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Catalog(err)
    }
}

// ========== 便捷构造函数 ==========

impl TransportError {
    /// 创建 API 调用失败错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TransportError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
