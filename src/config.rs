//! 运行时配置
//!
//! 与 worker 的 `[vars]` 读取方式一致：每个键都有默认值，
//! 读不到就回退，读到了但非法则报错。

use shopadmin_shared::DEFAULT_BACKEND_URL;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const ENV_BACKEND_URL: &str = "SHOPADMIN_BACKEND_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SHOPADMIN_REQUEST_TIMEOUT_SECS";
pub const ENV_PAGE_SIZE: &str = "SHOPADMIN_PAGE_SIZE";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: usize = 5;
const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 25];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: invalid backend URL `{value}`")]
    InvalidUrl { key: &'static str, value: String },
    #[error("{key}: expected a positive integer, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
}

/// 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct AdminConfig {
    /// 后端根地址（不含末尾 `/`）
    pub backend_url: String,
    /// 单个请求的客户端超时
    pub request_timeout: Duration,
    /// 列表默认每页条数
    pub default_page_size: usize,
    /// 分页控件可选的每页条数
    pub page_size_options: Vec<usize>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl AdminConfig {
    /// 通过任意键值查找函数构建配置
    ///
    /// 原生环境传入 `std::env::var`，浏览器端传入编译期常量。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BACKEND_URL) {
            config.backend_url = normalize_backend_url(ENV_BACKEND_URL, &url)?;
        }

        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = parse_positive(ENV_REQUEST_TIMEOUT_SECS, &secs)?;
            config.request_timeout = Duration::from_secs(secs as u64);
        }

        if let Some(size) = lookup(ENV_PAGE_SIZE) {
            let size = parse_positive(ENV_PAGE_SIZE, &size)?;
            config.default_page_size = size;
            if !config.page_size_options.contains(&size) {
                config.page_size_options.push(size);
                config.page_size_options.sort_unstable();
            }
        }

        Ok(config)
    }

    /// 从进程环境变量读取
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 替换后端地址（登录页手动输入、LocalStorage 记忆）
    pub fn with_backend_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.backend_url = normalize_backend_url(ENV_BACKEND_URL, url)?;
        Ok(self)
    }

    /// 商品图片的完整地址
    pub fn image_url(&self, relative: &str) -> String {
        format!("{}/{}", self.backend_url, relative.trim_start_matches('/'))
    }
}

fn normalize_backend_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AdminConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AdminConfig::default());
        assert_eq!(config.backend_url, "https://localhost:44315");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AdminConfig::from_lookup(lookup_from(&[
            (ENV_BACKEND_URL, "http://shop.local:8080/"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
            (ENV_PAGE_SIZE, "20"),
        ]))
        .unwrap();
        assert_eq!(config.backend_url, "http://shop.local:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.page_size_options, vec![5, 10, 20, 25]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AdminConfig::from_lookup(lookup_from(&[(ENV_PAGE_SIZE, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));

        let err =
            AdminConfig::from_lookup(lookup_from(&[(ENV_BACKEND_URL, "ftp://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_image_url() {
        let config = AdminConfig::default();
        assert_eq!(
            config.image_url("/images/ring.png"),
            "https://localhost:44315/images/ring.png"
        );
    }
}
