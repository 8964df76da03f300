use std::fmt;

use crate::client::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkdashError {
    Config(String),
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Conflict(String),
    Network(String),
    Backend(String),
    Serialization(String),
    FileOperation(String),
    Internal(String),
}

impl LinkdashError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkdashError::Config(_) => "E001",
            LinkdashError::Validation(_) => "E002",
            LinkdashError::NotFound(_) => "E003",
            LinkdashError::Unauthorized(_) => "E004",
            LinkdashError::Conflict(_) => "E005",
            LinkdashError::Network(_) => "E006",
            LinkdashError::Backend(_) => "E007",
            LinkdashError::Serialization(_) => "E008",
            LinkdashError::FileOperation(_) => "E009",
            LinkdashError::Internal(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkdashError::Config(_) => "Configuration Error",
            LinkdashError::Validation(_) => "Validation Error",
            LinkdashError::NotFound(_) => "Resource Not Found",
            LinkdashError::Unauthorized(_) => "Unauthorized",
            LinkdashError::Conflict(_) => "Conflict",
            LinkdashError::Network(_) => "Network Error",
            LinkdashError::Backend(_) => "Backend Error",
            LinkdashError::Serialization(_) => "Serialization Error",
            LinkdashError::FileOperation(_) => "File Operation Error",
            LinkdashError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkdashError::Config(msg)
            | LinkdashError::Validation(msg)
            | LinkdashError::NotFound(msg)
            | LinkdashError::Unauthorized(msg)
            | LinkdashError::Conflict(msg)
            | LinkdashError::Network(msg)
            | LinkdashError::Backend(msg)
            | LinkdashError::Serialization(msg)
            | LinkdashError::FileOperation(msg)
            | LinkdashError::Internal(msg) => msg,
        }
    }

    /// 面向用户的通知文案
    ///
    /// 网络/后端错误统一显示通用提示，其余错误直接显示消息。
    pub fn user_message(&self) -> String {
        match self {
            LinkdashError::Network(_) | LinkdashError::Backend(_) | LinkdashError::Internal(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
            other => other.message().to_string(),
        }
    }

    /// 格式化为彩色输出
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkdashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkdashError {}

// 便捷的构造函数
impl LinkdashError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkdashError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Unauthorized(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Conflict(msg.into())
    }

    pub fn network<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Network(msg.into())
    }

    pub fn backend<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Backend(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkdashError::FileOperation(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        LinkdashError::Internal(msg.into())
    }
}

impl From<std::io::Error> for LinkdashError {
    fn from(err: std::io::Error) -> Self {
        LinkdashError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkdashError {
    fn from(err: serde_json::Error) -> Self {
        LinkdashError::Serialization(err.to_string())
    }
}

impl From<ClientError> for LinkdashError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(msg) => LinkdashError::Network(msg),
            ClientError::Decode(msg) => LinkdashError::Serialization(msg),
            ClientError::RefreshFailed(msg) => LinkdashError::Unauthorized(msg),
            ClientError::Api { status, message } => match status {
                400 | 422 => LinkdashError::Validation(message),
                401 | 403 => LinkdashError::Unauthorized(message),
                404 => LinkdashError::NotFound(message),
                409 => LinkdashError::Conflict(message),
                _ => LinkdashError::Backend(message),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkdashError>;
