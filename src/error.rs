use std::fmt;

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误分类
///
/// 决定了调用方如何处理失败：认证失败走登录重定向，
/// 网络/超时失败保留旧数据，后端拒绝需要展示给用户。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminErrorStatus {
    /// 401/403：会话缺失或过期（预期内）
    Unauthorized,
    /// 非 2xx 且非 401 的后端响应（如校验失败）
    Rejected,
    /// 网络层失败（连接失败、请求无法发出）
    Network,
    /// 客户端超时
    Timeout,
    /// JSON 序列化/反序列化失败
    Serialization,
    /// 客户端校验失败
    InvalidInput,
    /// 配置值非法
    Config,
}

impl AdminErrorStatus {
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminErrorStatus::Unauthorized => "UNAUTHORIZED",
            AdminErrorStatus::Rejected => "REJECTED",
            AdminErrorStatus::Network => "NETWORK_ERROR",
            AdminErrorStatus::Timeout => "TIMEOUT",
            AdminErrorStatus::Serialization => "JSON_PARSE_ERROR",
            AdminErrorStatus::InvalidInput => "INVALID_INPUT",
            AdminErrorStatus::Config => "INVALID_CONFIG",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "session.login", "api.send"
    pub operation: String,
    pub detail: Option<String>,
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端统一错误
///
/// - status: 错误分类
/// - message: 面向用户/日志的消息
/// - http_status: 后端返回的状态码（仅后端响应类错误）
/// - source: 原始错误
/// - spans: 操作追踪栈
#[derive(Debug)]
pub struct AdminError {
    pub status: AdminErrorStatus,
    pub message: String,
    http_status: Option<u16>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl AdminError {
    pub fn new(status: AdminErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            http_status: None,
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AdminErrorStatus::Unauthorized, message)
    }

    /// 后端以非成功状态码拒绝了请求
    pub fn rejected(http_status: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(AdminErrorStatus::Rejected, message);
        err.http_status = Some(http_status);
        err
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AdminErrorStatus::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AdminErrorStatus::Timeout, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(AdminErrorStatus::Serialization, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(AdminErrorStatus::InvalidInput, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(AdminErrorStatus::Config, message)
    }

    /// 按状态码分类后端响应
    pub fn from_http_status(http_status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP {}", http_status)
        } else {
            format!("HTTP {}: {}", http_status, body.trim())
        };
        let mut err = if matches!(http_status, 401 | 403) {
            Self::unauthorized(message)
        } else {
            Self::new(AdminErrorStatus::Rejected, message)
        };
        err.http_status = Some(http_status);
        err
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == AdminErrorStatus::Unauthorized
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        AdminError::serialization(e.to_string()).with_source(e)
    }
}

impl From<url::ParseError> for AdminError {
    fn from(e: url::ParseError) -> Self {
        AdminError::config(format!("invalid URL: {}", e)).with_source(e)
    }
}

impl From<crate::config::ConfigError> for AdminError {
    fn from(e: crate::config::ConfigError) -> Self {
        AdminError::config(e.to_string()).with_source(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_classification() {
        let err = AdminError::from_http_status(401, "");
        assert!(err.is_unauthorized());
        assert_eq!(err.http_status(), Some(401));

        let err = AdminError::from_http_status(400, "{\"errors\":[\"name\"]}");
        assert_eq!(err.status, AdminErrorStatus::Rejected);
        assert!(err.message().contains("errors"));
    }

    #[test]
    fn test_display_with_trace() {
        let err = AdminError::network("connection refused")
            .in_op("http.send")
            .in_op_with("api.send", "/pingauth");
        assert_eq!(
            err.to_string(),
            "[NETWORK_ERROR] connection refused | trace: http.send -> api.send(/pingauth)"
        );
    }
}
