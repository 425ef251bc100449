//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面
    Login,
    /// 仪表盘 (首页)
    #[default]
    Home,
    Products,
    Categories,
    Orders,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 导航栏中的页面，按显示顺序
    pub const NAV: [AppRoute; 4] = [
        AppRoute::Home,
        AppRoute::Products,
        AppRoute::Categories,
        AppRoute::Orders,
    ];

    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.trim_end_matches('/');
        match path {
            "" => Self::Home,
            "/login" => Self::Login,
            "/products" => Self::Products,
            "/categories" => Self::Categories,
            "/orders" => Self::Orders,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
            Self::Products => "/products",
            Self::Categories => "/categories",
            Self::Orders => "/orders",
            Self::NotFound => "/404",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Home => "Home",
            Self::Products => "Products",
            Self::Categories => "Categories",
            Self::Orders => "Orders",
            Self::NotFound => "Not Found",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::Products | Self::Categories | Self::Orders
        )
    }

    /// 定义已认证用户是否应该离开此路由（登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 是否显示导航栏
    pub fn shows_chrome(&self) -> bool {
        self.requires_auth()
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Home
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_round_trip_for_known_routes() {
        for route in [
            AppRoute::Login,
            AppRoute::Home,
            AppRoute::Products,
            AppRoute::Categories,
            AppRoute::Orders,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/products/"), AppRoute::Products);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn test_login_is_public_and_chromeless() {
        assert!(!AppRoute::Login.requires_auth());
        assert!(!AppRoute::Login.shows_chrome());
        assert!(AppRoute::Login.should_redirect_when_authenticated());
        assert!(AppRoute::NAV.iter().all(|r| r.requires_auth()));
    }
}
