//! 链接表单的 URL 与自定义短码校验
//!
//! 在请求发往后端之前拦截无效输入

use url::Url;

/// URL 校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    /// 非 http/https，或 javascript: / data: 等被拦截的协议
    UnsupportedScheme(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported scheme '{}': use http:// or https://", scheme)
            }
            Self::MissingHost => write!(f, "URL has no host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl UrlValidationError {
    /// 表单上显示的提示
    pub fn field_message(&self) -> &'static str {
        match self {
            Self::EmptyUrl => "URL is required",
            _ => "Please enter a valid URL",
        }
    }
}

/// 校验目标 URL，返回规范化后的字符串
pub fn validate_url(raw: &str) -> Result<String, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let parsed = Url::parse(raw).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(parsed.to_string())
}

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 32;

/// 自定义短码：3-32 位，仅允许字母、数字、`-`、`_`
pub fn validate_custom_slug(slug: &str) -> Result<(), String> {
    let len = slug.chars().count();
    if !(SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&len) {
        return Err(format!(
            "Custom slug must be {}-{} characters",
            SLUG_MIN_LEN, SLUG_MAX_LEN
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Custom slug may only contain letters, numbers, '-' and '_'".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://example.com/a").is_ok());
        assert!(validate_url("  http://localhost:8080/x?y=1 ").is_ok());
        assert_eq!(
            validate_url("https://Example.com").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_rejected_schemes() {
        assert!(matches!(
            validate_url("javascript:alert(1)"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(validate_url(""), Err(UrlValidationError::EmptyUrl));
        assert!(matches!(
            validate_url("example.com"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert_eq!(
            validate_url("not a url").unwrap_err().field_message(),
            "Please enter a valid URL"
        );
    }

    #[test]
    fn test_custom_slug() {
        assert!(validate_custom_slug("example").is_ok());
        assert!(validate_custom_slug("my_link-2").is_ok());
        assert!(validate_custom_slug("ab").is_err());
        assert!(validate_custom_slug("has space").is_err());
        assert!(validate_custom_slug(&"x".repeat(33)).is_err());
    }
}
