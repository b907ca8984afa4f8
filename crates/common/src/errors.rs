use thiserror::Error;

/// 统一错误类型
///
/// Display 文本即为最终呈现给用户的错误信息，不再额外包装
#[derive(Error, Debug)]
pub enum Error {
    /// 底层 HTTP 调用失败（连接、DNS、超时等）
    #[error("{0}")]
    Transport(String),

    /// 非 200 响应，携带状态描述（如 "Not Found"）
    #[error("{0}")]
    Status(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 信封响应中 ec 不为 EOK 时的 error 内容
    #[error("{0}")]
    Remote(String),

    /// 异步任务失败，携带任务描述
    #[error("{0}")]
    JobFailed(String),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("配置错误: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidArgument(String),

    /// 远端资源存在但尚未就绪，如客户机还未上报 IP
    #[error("{0}")]
    NotReady(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// 名称解析失败
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// 统一结果类型
pub type Result<T> = std::result::Result<T, Error>;
