use crate::error::{AdminError, AdminResult};
use crate::request::{FormPart, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use shopadmin_shared::protocol::ApiRequest;
use url::Url;

// =========================================================
// 后端网关 (Backend Gateway)
// =========================================================

/// 统一的后端调用入口
///
/// 负责拼接 URL、序列化请求体、按状态码分类错误。
/// 所有请求都带 Cookie 凭证，由具体的 `HttpClient` 实现负责。
pub struct BackendClient<C: HttpClient> {
    base_url: Url,
    client: C,
}

impl<C: HttpClient> BackendClient<C> {
    pub fn new(base_url: &str, client: C) -> AdminResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| AdminError::from(e).in_op("api.new"))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// 拼接完整 URL，查询参数按给定顺序编码
    ///
    /// 后端地址可以带路径前缀（反向代理场景），因此不使用 `Url::join`。
    pub fn url_for(&self, path: &str, query: &[(&'static str, String)]) -> AdminResult<String> {
        let raw = format!("{}/{}", self.base_url(), path.trim_start_matches('/'));
        let mut url =
            Url::parse(&raw).map_err(|e| AdminError::from(e).in_op_with("api.url", raw.clone()))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.to_string())
    }

    /// 发送请求并返回原始响应（非 2xx 转为错误）
    pub async fn execute<R: ApiRequest>(&self, req: &R) -> AdminResult<HttpResponse> {
        let path = req.path();
        let url = self.url_for(&path, &req.query())?;

        let mut http_req = HttpRequest::new(&url, R::METHOD);
        if req.has_body() {
            let body = serde_json::to_string(req)
                .map_err(|e| AdminError::from(e).in_op_with("api.encode", path.clone()))?;
            http_req = http_req.with_json(body);
        }

        tracing::debug!(method = R::METHOD.as_str(), %url, "backend request");
        let resp = self
            .client
            .send(http_req)
            .await
            .map_err(|e| e.in_op_with("api.send", path.clone()))?;

        if !resp.ok() {
            return Err(AdminError::from_http_status(resp.status, &resp.body)
                .in_op_with("api.send", path));
        }
        Ok(resp)
    }

    /// 发送请求并解析为声明的响应类型
    pub async fn send<R: ApiRequest>(&self, req: &R) -> AdminResult<R::Response> {
        let resp = self.execute(req).await?;
        resp.json::<R::Response>()
            .map_err(|e| e.in_op_with("api.decode", req.path()))
    }

    /// multipart 表单请求（商品保存）
    pub async fn send_multipart(
        &self,
        method: HttpMethod,
        path: &str,
        parts: Vec<FormPart>,
    ) -> AdminResult<HttpResponse> {
        let url = self.url_for(path, &[])?;
        let http_req = HttpRequest::new(&url, method).with_multipart(parts);

        tracing::debug!(method = method.as_str(), %url, "backend multipart request");
        let resp = self
            .client
            .send(http_req)
            .await
            .map_err(|e| e.in_op_with("api.multipart", path.to_string()))?;

        if !resp.ok() {
            return Err(AdminError::from_http_status(resp.status, &resp.body)
                .in_op_with("api.multipart", path.to_string()));
        }
        Ok(resp)
    }
}
