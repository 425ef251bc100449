//! 认证模块
//!
//! 核心库的 `AuthStore` 是会话的唯一来源；这里把它包装进 Context，
//! 并通过订阅把会话镜像到一个响应式信号，供路由服务和界面读取。

use crate::web::{BrowserStorage, FetchHttpClient};
use leptos::prelude::*;
use shopadmin::AdminClient;
use shopadmin::auth::Session;
use shopadmin::config::{AdminConfig, ENV_BACKEND_URL, ENV_PAGE_SIZE, ENV_REQUEST_TIMEOUT_SECS};
use shopadmin::error::AdminResult;
use shopadmin::session::LoginOutcome;

const STORAGE_URL_KEY: &str = "shopadmin_backend_url";

/// 浏览器端的组合客户端
pub type Client = AdminClient<FetchHttpClient>;

/// 编译期配置（`SHOPADMIN_*` 环境变量在构建时写入）
fn compiled_config() -> AdminResult<AdminConfig> {
    let config = AdminConfig::from_lookup(|key| {
        let value = match key {
            ENV_BACKEND_URL => option_env!("SHOPADMIN_BACKEND_URL"),
            ENV_REQUEST_TIMEOUT_SECS => option_env!("SHOPADMIN_REQUEST_TIMEOUT_SECS"),
            ENV_PAGE_SIZE => option_env!("SHOPADMIN_PAGE_SIZE"),
            _ => None,
        };
        value.map(str::to_string)
    })?;
    Ok(config)
}

fn build_client(config: AdminConfig) -> AdminResult<Client> {
    let transport = FetchHttpClient::new(config.request_timeout);
    AdminClient::new(config, transport)
}

/// 认证上下文
///
/// 客户端含 `Rc`，放在本地存储的 `StoredValue` 里；句柄本身是 `Copy` 的。
#[derive(Clone, Copy)]
pub struct AuthContext {
    client: StoredValue<Client, LocalStorage>,
    /// 会话镜像（只读使用）
    pub session: RwSignal<Session>,
    /// 当前连接的后端地址（用于 UI 显示和登录页自动填充）
    pub backend_url: RwSignal<String>,
}

impl AuthContext {
    fn new(client: Client) -> Self {
        let ctx = Self {
            session: RwSignal::new(client.auth.session()),
            backend_url: RwSignal::new(client.config.backend_url.clone()),
            client: StoredValue::new_local(client),
        };
        ctx.mirror_session();
        ctx
    }

    /// 订阅当前客户端的会话变化
    fn mirror_session(&self) {
        let session = self.session;
        self.client.with_value(|client| {
            client.auth.subscribe(move |next| {
                session.try_set(next.clone());
            })
        });
    }

    /// 取一份客户端句柄（廉价克隆）
    pub fn client(&self) -> Client {
        self.client.get_value()
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.is_authenticated()))
    }

    pub fn email(&self) -> Signal<Option<String>> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.email().map(str::to_string)))
    }

    /// 切换后端地址：重建客户端，旧会话随之作废
    pub fn connect(&self, url: &str) -> AdminResult<()> {
        let config = self.client.with_value(|c| (*c.config).clone()).with_backend_url(url)?;
        if config.backend_url == self.backend_url.get_untracked() {
            return Ok(());
        }

        let client = build_client(config)?;
        tracing::info!(backend = %client.config.backend_url, "backend changed");
        BrowserStorage::set(STORAGE_URL_KEY, &client.config.backend_url);
        self.backend_url.set(client.config.backend_url.clone());
        self.session.set(client.auth.session());
        self.client.set_value(client);
        self.mirror_session();
        Ok(())
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// 初始化认证上下文
///
/// 编译期配置打底，上次使用的后端地址（LocalStorage）优先。
/// 会话本身不落盘：由 Cookie 承载，页面加载后由守卫探测恢复。
pub fn init_auth() -> AdminResult<AuthContext> {
    let mut config = compiled_config()?;

    if let Some(url) = BrowserStorage::get(STORAGE_URL_KEY) {
        match config.clone().with_backend_url(&url) {
            Ok(remembered) => config = remembered,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring remembered backend URL");
                BrowserStorage::delete(STORAGE_URL_KEY);
            }
        }
    }

    Ok(AuthContext::new(build_client(config)?))
}

/// 登录；会话镜像由订阅自动更新
pub async fn login(
    ctx: AuthContext,
    email: String,
    password: String,
    remember_me: bool,
) -> AdminResult<LoginOutcome> {
    let client = ctx.client();
    client.auth.login(&email, &password, remember_me).await
}

/// 注销并清除状态
///
/// 导航将由路由服务的认证状态监听自动处理。
pub async fn logout(ctx: AuthContext) {
    ctx.client().auth.logout().await;
}
