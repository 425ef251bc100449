use crate::error::{AdminError, AdminResult};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::rc::Rc;

pub use shopadmin_shared::protocol::HttpMethod;

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// multipart 表单字段
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

/// 请求体
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(String),
    Multipart(Vec<FormPart>),
}

/// 通用 HTTP 请求结构
///
/// 所有请求都携带 Cookie（由传输层负责），这里不显式建模。
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_json(mut self, body: String) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = RequestBody::Json(body);
        self
    }

    /// multipart 的 Content-Type（含 boundary）由传输层生成
    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析 JSON 响应体，空响应体按 `null` 处理
    pub fn json<T: DeserializeOwned>(&self) -> AdminResult<T> {
        let text = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(text).map_err(AdminError::from)
    }
}

/// HTTP 客户端特性 (Trait)
///
/// (?Send)：浏览器端的 fetch Future 不是 Send，整个客户端运行在单线程事件循环上。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse>;
}

#[async_trait::async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for Rc<T> {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        (**self).send(req).await
    }
}

#[async_trait::async_trait(?Send)]
impl<'a, T: HttpClient + ?Sized> HttpClient for &'a T {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        (**self).send(req).await
    }
}

// =========================================================
// 实现层: reqwest 客户端 (原生环境)
// =========================================================

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestHttpClient;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;
    use std::time::Duration;

    /// 带 Cookie 存储和超时的 reqwest 客户端
    #[derive(Clone)]
    pub struct ReqwestHttpClient {
        client: reqwest::Client,
    }

    impl ReqwestHttpClient {
        pub fn new(timeout: Duration) -> AdminResult<Self> {
            let client = reqwest::Client::builder()
                .cookie_store(true)
                .timeout(timeout)
                .build()
                .map_err(|e| AdminError::config(e.to_string()).in_op("http.client"))?;
            Ok(Self { client })
        }
    }

    fn map_reqwest_error(e: reqwest::Error) -> AdminError {
        if e.is_timeout() {
            AdminError::timeout(e.to_string()).with_source(e)
        } else {
            AdminError::network(e.to_string()).with_source(e)
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for ReqwestHttpClient {
        async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
            let method = match req.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, &req.url);

            for (k, v) in &req.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }

            builder = match req.body {
                RequestBody::Empty => builder,
                RequestBody::Json(body) => builder.body(body),
                RequestBody::Multipart(parts) => {
                    let mut form = reqwest::multipart::Form::new();
                    for part in parts {
                        form = match part.value {
                            FormValue::Text(text) => form.text(part.name, text),
                            FormValue::File {
                                file_name,
                                content_type,
                                bytes,
                            } => {
                                let file = reqwest::multipart::Part::bytes(bytes)
                                    .file_name(file_name)
                                    .mime_str(&content_type)
                                    .map_err(|e| {
                                        AdminError::invalid_input(e.to_string())
                                            .in_op("http.multipart")
                                    })?;
                                form.part(part.name, file)
                            }
                        };
                    }
                    builder.multipart(form)
                }
            };

            let resp = builder
                .send()
                .await
                .map_err(|e| map_reqwest_error(e).in_op_with("http.send", req.url.clone()))?;

            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .map_err(|e| map_reqwest_error(e).in_op_with("http.body", req.url.clone()))?;

            Ok(HttpResponse { status, body })
        }
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

/// 已记录的请求
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
}

#[cfg(test)]
type MockHandler = Box<dyn Fn(&HttpRequest) -> AdminResult<HttpResponse>>;

#[cfg(test)]
pub struct MockHttpClient {
    // (METHOD URL) -> (Status, Response Body)
    responses: RefCell<HashMap<String, (u16, String)>>,
    // 兜底处理器，用于模拟带状态的后端
    handler: RefCell<Option<MockHandler>>,
    pub requests: RefCell<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            handler: RefCell::new(None),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.responses.borrow_mut().insert(
            format!("{} {}", method.as_str(), url),
            (status, body.to_string()),
        );
    }

    pub fn mock_status(&self, method: HttpMethod, url: &str, status: u16) {
        self.responses
            .borrow_mut()
            .insert(format!("{} {}", method.as_str(), url), (status, String::new()));
    }

    pub fn mock_handler<F>(&self, handler: F)
    where
        F: Fn(&HttpRequest) -> AdminResult<HttpResponse> + 'static,
    {
        *self.handler.borrow_mut() = Some(Box::new(handler));
    }

    pub fn request_urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: req.url.clone(),
            method: req.method,
            headers: req.headers.clone(),
            body: req.body.clone(),
        });

        let key = format!("{} {}", req.method.as_str(), req.url);
        if let Some((status, body)) = self.responses.borrow().get(&key) {
            return Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            });
        }

        if let Some(handler) = self.handler.borrow().as_ref() {
            return handler(&req);
        }

        Ok(HttpResponse {
            status: 404,
            body: "Not Found".to_string(),
        })
    }
}
