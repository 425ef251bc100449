//! 商城后台的客户端核心
//!
//! 与平台无关：会话、路由守卫、列表查询控制器、变更对话框、各实体服务。
//! 浏览器端（frontend）注入基于 fetch 的 `HttpClient`，原生环境使用 reqwest。
//! 全部运行在单线程事件循环上，共享状态使用 `Rc`/`RefCell`。

pub mod api;
pub mod auth;
pub mod config;
pub mod dialog;
pub mod error;
pub mod guard;
pub mod query;
pub mod request;
pub mod route;
pub mod services;
pub mod session;

use api::BackendClient;
use auth::AuthStore;
use config::AdminConfig;
use error::AdminResult;
use request::HttpClient;
use services::AdminServices;
use session::HttpSessionClient;
use std::rc::Rc;

// =========================================================
// 组装入口 (Composition Root)
// =========================================================

/// 应用级依赖：配置、认证状态、各实体服务
///
/// 整个应用生命周期只创建一次，句柄廉价克隆。
pub struct AdminClient<C: HttpClient + 'static> {
    pub config: Rc<AdminConfig>,
    pub auth: AuthStore,
    pub services: AdminServices<C>,
}

impl<C: HttpClient + 'static> Clone for AdminClient<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            auth: self.auth.clone(),
            services: self.services.clone(),
        }
    }
}

impl<C: HttpClient + Clone + 'static> AdminClient<C> {
    /// 会话和各服务共享同一个传输层（同一个 Cookie 存储）
    pub fn new(config: AdminConfig, client: C) -> AdminResult<Self> {
        let session_api = BackendClient::new(&config.backend_url, client.clone())?;
        let api = Rc::new(BackendClient::new(&config.backend_url, client)?);

        tracing::info!(backend = %config.backend_url, "admin client initialised");

        Ok(Self {
            auth: AuthStore::new(Rc::new(HttpSessionClient::new(session_api))),
            services: AdminServices::new(api),
            config: Rc::new(config),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AdminClient<request::ReqwestHttpClient> {
    /// 原生环境：从进程环境变量读取配置
    pub fn from_env() -> AdminResult<Self> {
        let config = AdminConfig::from_env()?;
        let client = request::ReqwestHttpClient::new(config.request_timeout)?;
        Self::new(config, client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpMethod, MockHttpClient};
    use serde_json::json;

    #[tokio::test]
    async fn test_login_through_composed_client() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_status(
            HttpMethod::Post,
            "https://shop.test/login?useSessionCookies=true",
            200,
        );
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/pingauth",
            200,
            json!({"email": "admin@shop.test"}),
        );
        let config = AdminConfig::default()
            .with_backend_url("https://shop.test/")
            .unwrap();
        let client = AdminClient::new(config, mock.clone()).unwrap();

        client
            .auth
            .login("admin@shop.test", "secret", false)
            .await
            .unwrap();
        assert_eq!(client.auth.session().email(), Some("admin@shop.test"));
        assert_eq!(
            mock.request_urls(),
            vec![
                "https://shop.test/login?useSessionCookies=true",
                "https://shop.test/pingauth"
            ]
        );
    }
}
