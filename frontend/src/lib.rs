//! 商城后台前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `shopadmin`: 会话、守卫、列表控制器、对话框状态（与平台无关）
//! - `web::router`: 路由服务（History API）
//! - `auth`: 认证上下文，镜像核心库的 `AuthStore`
//! - `components`: UI 组件层

mod auth;
mod components {
    pub mod categories;
    pub mod confirm_delete;
    pub mod home;
    pub mod layout;
    pub mod list;
    pub mod login;
    pub mod orders;
    pub mod pagination;
    pub mod products;
}

use crate::auth::init_auth;
use crate::components::categories::CategoriesPage;
use crate::components::home::HomePage;
use crate::components::layout::AuthorizedView;
use crate::components::login::LoginPage;
use crate::components::orders::OrdersPage;
use crate::components::products::ProductsPage;

use leptos::prelude::*;
use shopadmin::route::AppRoute;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod file;
    mod http;
    pub mod log;
    pub mod router;
    mod storage;

    pub use file::{read_image, selected_file};
    pub use http::FetchHttpClient;
    pub use storage::BrowserStorage;
}

use web::router::{Router, RouterOutlet};

/// 安装控制台日志（在挂载前调用）
pub fn init_logging() {
    web::log::init();
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件；受保护页面包在守卫里。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Home => view! {
            <AuthorizedView route=route><HomePage /></AuthorizedView>
        }
        .into_any(),
        AppRoute::Products => view! {
            <AuthorizedView route=route><ProductsPage /></AuthorizedView>
        }
        .into_any(),
        AppRoute::Categories => view! {
            <AuthorizedView route=route><CategoriesPage /></AuthorizedView>
        }
        .into_any(),
        AppRoute::Orders => view! {
            <AuthorizedView route=route><OrdersPage /></AuthorizedView>
        }
        .into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文（配置非法时停在错误页）
    let auth_ctx = match init_auth() {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise admin client");
            let message = e.message().to_string();
            return view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <div role="alert" class="alert alert-error max-w-lg">
                        <span>"Invalid configuration: " {message}</span>
                    </div>
                </div>
            }
            .into_any();
        }
    };
    provide_context(auth_ctx);

    // 2. 获取认证状态信号，用于注入路由服务（解耦！）
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        // 3. 路由器组件：注入认证信号，登录/登出后自动跳转
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
    .into_any()
}
