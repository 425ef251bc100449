//! HTTP 传输层
//!
//! 基于 `web_sys::fetch` 实现核心库的 `HttpClient`：
//! 所有请求 `credentials: include`（会话 Cookie 由浏览器管理），
//! 超时通过 `gloo-timers` 竞速并用 `AbortController` 取消底层请求。

use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use shopadmin::error::{AdminError, AdminResult};
use shopadmin::request::{FormPart, FormValue, HttpClient, HttpRequest, HttpResponse, RequestBody};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AbortController, Blob, BlobPropertyBag, FormData, Headers, Request, RequestCredentials,
    RequestInit, Response,
};

fn js_error(context: &str, e: JsValue) -> AdminError {
    AdminError::network(format!("{}: {:?}", context, e))
}

/// 浏览器 fetch 客户端
#[derive(Debug, Clone, Copy)]
pub struct FetchHttpClient {
    timeout: Duration,
}

impl FetchHttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// multipart 表单转成 `FormData`，文件字段包成 `Blob`
fn form_data(parts: &[FormPart]) -> AdminResult<FormData> {
    let form = FormData::new().map_err(|e| js_error("创建 FormData 失败", e))?;
    for part in parts {
        match &part.value {
            FormValue::Text(text) => form
                .append_with_str(&part.name, text)
                .map_err(|e| js_error("设置表单字段失败", e))?,
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let chunks = js_sys::Array::new();
                chunks.push(&js_sys::Uint8Array::from(bytes.as_slice()));
                let bag = BlobPropertyBag::new();
                bag.set_type(content_type);
                let blob = Blob::new_with_u8_array_sequence_and_options(&chunks, &bag)
                    .map_err(|e| js_error("创建 Blob 失败", e))?;
                form.append_with_blob_and_filename(&part.name, &blob, file_name)
                    .map_err(|e| js_error("设置文件字段失败", e))?;
            }
        }
    }
    Ok(form)
}

fn build_request(req: &HttpRequest, controller: &AbortController) -> AdminResult<Request> {
    let headers = Headers::new().map_err(|e| js_error("创建 Headers 失败", e))?;
    for (key, value) in &req.headers {
        headers
            .set(key, value)
            .map_err(|e| js_error("设置 Header 失败", e))?;
    }

    let opts = RequestInit::new();
    opts.set_method(req.method.as_str());
    opts.set_headers(&headers.into());
    opts.set_credentials(RequestCredentials::Include);
    opts.set_signal(Some(&controller.signal()));

    match &req.body {
        RequestBody::Empty => {}
        RequestBody::Json(body) => opts.set_body(&JsValue::from_str(body)),
        // Content-Type（含 boundary）由浏览器根据 FormData 生成
        RequestBody::Multipart(parts) => opts.set_body(&form_data(parts)?.into()),
    }

    Request::new_with_str_and_init(&req.url, &opts).map_err(|e| js_error("构建请求失败", e))
}

async fn fetch(request: Request) -> AdminResult<HttpResponse> {
    let window = web_sys::window().ok_or_else(|| AdminError::network("无法获取 window 对象"))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_error("网络错误", e))?;
    let response: Response = resp_value
        .dyn_into()
        .map_err(|e| js_error("Response 类型转换失败", e))?;

    let status = response.status();
    let promise = response
        .text()
        .map_err(|e| js_error("读取响应失败", e))?;
    let body = JsFuture::from(promise)
        .await
        .map_err(|e| js_error("读取响应失败", e))?
        .as_string()
        .unwrap_or_default();

    Ok(HttpResponse { status, body })
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        let controller = AbortController::new().map_err(|e| js_error("创建 AbortController 失败", e))?;
        let request = build_request(&req, &controller)?;

        let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        let request_future = Box::pin(fetch(request));
        let timeout = TimeoutFuture::new(millis);

        match select(request_future, timeout).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => {
                controller.abort();
                tracing::warn!(method = req.method.as_str(), url = %req.url, "request timed out");
                Err(AdminError::timeout(format!(
                    "{} {} timed out after {}s",
                    req.method.as_str(),
                    req.url,
                    self.timeout.as_secs()
                )))
            }
        }
    }
}
