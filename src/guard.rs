//! 路由守卫
//!
//! 状态机：`Checking -> {Authorized, Unauthorized}`。
//! 受保护页面在状态确定前只渲染加载中，探测失败一律跳转登录页，
//! 不会停留在加载状态。

use crate::auth::AuthStore;
use crate::route::AppRoute;
use std::cell::Cell;
use std::rc::Rc;


/// 守卫状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Authorized,
    Unauthorized,
}

/// 守卫决定的渲染内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    /// 只显示加载提示
    Loading,
    /// 显示页面，`chrome` 表示是否带导航栏
    Content { chrome: bool },
    /// 已跳转，不渲染任何内容
    Nothing,
}

/// 导航能力（浏览器端由 History API 实现）
pub trait Navigator {
    fn navigate(&self, route: AppRoute);
}

/// 单个页面实例的守卫
///
/// 页面卸载后调用 `unmount`，之后才返回的探测结果会被忽略。
#[derive(Clone)]
pub struct RouteGuard {
    store: AuthStore,
    navigator: Rc<dyn Navigator>,
    state: Rc<Cell<GuardState>>,
    mounted: Rc<Cell<bool>>,
}

impl RouteGuard {
    pub fn new(store: AuthStore, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            state: Rc::new(Cell::new(GuardState::Checking)),
            mounted: Rc::new(Cell::new(true)),
        }
    }

    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    pub fn unmount(&self) {
        self.mounted.set(false);
    }

    /// 进入页面
    pub async fn enter(&self, route: AppRoute) -> GuardState {
        if !route.requires_auth() {
            self.state.set(GuardState::Authorized);
            return GuardState::Authorized;
        }

        if self.store.is_authenticated() {
            self.state.set(GuardState::Authorized);
            return GuardState::Authorized;
        }

        self.state.set(GuardState::Checking);
        let authorized = match self.store.check_authorization().await {
            Ok(authorized) => authorized,
            Err(e) => {
                tracing::warn!(error = %e, route = %route, "probe failed, treating as unauthorized");
                false
            }
        };

        if !self.mounted.get() {
            tracing::debug!(route = %route, "guard unmounted before probe resolved");
            return self.state.get();
        }

        if authorized {
            self.state.set(GuardState::Authorized);
        } else {
            self.state.set(GuardState::Unauthorized);
            self.navigator.navigate(AppRoute::auth_failure_redirect());
        }
        self.state.get()
    }

    /// 当前应渲染的内容
    pub fn view(&self, route: AppRoute) -> GuardView {
        match self.state.get() {
            GuardState::Checking => GuardView::Loading,
            GuardState::Authorized => GuardView::Content {
                chrome: route.shows_chrome(),
            },
            GuardState::Unauthorized => GuardView::Nothing,
        }
    }

    /// 登录页的前置检查：已登录则直接跳转首页
    ///
    /// 返回是否发生了跳转。
    pub async fn forward_from_login(&self) -> bool {
        let authorized = if self.store.is_authenticated() {
            true
        } else {
            match self.store.check_authorization().await {
                Ok(authorized) => authorized,
                Err(e) => {
                    tracing::debug!(error = %e, "login forward check failed");
                    false
                }
            }
        };

        if authorized && self.mounted.get() {
            self.navigator.navigate(AppRoute::auth_success_redirect());
            return true;
        }
        false
    }
}
