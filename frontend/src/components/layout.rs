//! 受保护页面的外壳：路由守卫、导航栏、通知提示

use crate::auth::{logout, use_auth};
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use shopadmin::guard::{GuardView, Navigator, RouteGuard};
use shopadmin::route::AppRoute;
use std::rc::Rc;
use std::time::Duration;

/// 通知内容：(消息, 是否出错)
pub type Notification = RwSignal<Option<(String, bool)>>;

pub fn notify_ok(notification: Notification, message: impl Into<String>) {
    notification.try_set(Some((message.into(), false)));
}

pub fn notify_err(notification: Notification, message: impl Into<String>) {
    notification.try_set(Some((message.into(), true)));
}

/// 守卫包装
///
/// 授权确定前只显示加载提示；探测失败时守卫已跳转登录页，这里什么都不渲染。
#[component]
pub fn AuthorizedView(route: AppRoute, children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let navigator: Rc<dyn Navigator> = Rc::new(router);
    let guard = RouteGuard::new(auth.client().auth.clone(), navigator);
    let view_state = RwSignal::new(guard.view(route));
    let guard = StoredValue::new_local(guard);

    spawn_local(async move {
        let Some(guard) = guard.try_get_value() else {
            return;
        };
        guard.enter(route).await;
        view_state.try_set(guard.view(route));
    });

    // 卸载后返回的探测结果不再触发跳转
    on_cleanup(move || {
        guard.try_with_value(|g| g.unmount());
    });

    move || match view_state.get() {
        GuardView::Loading => view! {
            <div class="flex items-center justify-center min-h-screen">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        }
        .into_any(),
        GuardView::Nothing => ().into_any(),
        GuardView::Content { chrome } => view! {
            <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
                <div class="max-w-7xl mx-auto space-y-8">
                    {chrome.then(|| view! { <Navbar /> })}
                    {children()}
                </div>
            </div>
        }
        .into_any(),
    }
}

/// 顶部导航：页面链接、当前用户、登出
#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    // 路由变化时整个页面（含导航栏）重新渲染，这里读一次即可
    let current = router.current_route().get_untracked();
    let email = auth.email();

    let on_logout = move |_| {
        spawn_local(async move {
            logout(auth).await;
            router.go(AppRoute::auth_failure_redirect());
        });
    };

    view! {
        <div class="navbar bg-base-100 rounded-box shadow-xl">
            <div class="flex-1 gap-2">
                <span class="btn btn-ghost text-xl">"Shop Admin"</span>
                <ul class="menu menu-horizontal px-1">
                    {AppRoute::NAV
                        .into_iter()
                        .map(|route| {
                            let class = if current == route { "active" } else { "" };
                            view! {
                                <li>
                                    <Link to=route class=class>{route.title()}</Link>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </div>
            <div class="flex-none gap-2">
                <span class="badge badge-neutral hidden md:inline-flex">
                    {move || email.get().unwrap_or_default()}
                </span>
                <button on:click=on_logout class="btn btn-outline btn-error">
                    "Logout"
                </button>
            </div>
        </div>
    }
}

/// 右上角通知，3 秒后自动消失
#[component]
pub fn Toast(notification: Notification) -> impl IntoView {
    Effect::new(move |_| {
        if notification.get().is_some() {
            set_timeout(
                move || {
                    notification.try_set(None);
                },
                Duration::from_secs(3),
            );
        }
    });

    view! {
        <Show when=move || notification.get().is_some()>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    let is_err = notification.get().is_some_and(|(_, is_err)| is_err);
                    if is_err { "alert alert-error shadow-lg" } else { "alert alert-success shadow-lg" }
                }>
                    <span>{move || notification.get().map(|(msg, _)| msg).unwrap_or_default()}</span>
                </div>
            </div>
        </Show>
    }
}
