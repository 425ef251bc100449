use crate::auth::{login, use_auth};
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use shopadmin::guard::{Navigator, RouteGuard};
use shopadmin::route::AppRoute;
use shopadmin::session::LoginOutcome;
use std::rc::Rc;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (remember_me, set_remember_me) = signal(false);
    let (backend_url, set_backend_url) = signal(auth.backend_url.get_untracked());
    let (is_checking, set_is_checking) = signal(true);
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 已有有效会话（Cookie 仍在）时直接进入首页
    let navigator: Rc<dyn Navigator> = Rc::new(router);
    let guard = StoredValue::new_local(RouteGuard::new(auth.client().auth.clone(), navigator));
    spawn_local(async move {
        let Some(guard) = guard.try_get_value() else {
            return;
        };
        guard.forward_from_login().await;
        set_is_checking.try_set(false);
    });
    on_cleanup(move || {
        guard.try_with_value(|g| g.unmount());
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get().trim().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("Please enter your email and password".to_string()));
            return;
        }
        if let Err(e) = auth.connect(&backend_url.get()) {
            set_error_msg.set(Some(e.message().to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            match login(auth, email.get_untracked(), password.get_untracked(), remember_me.get_untracked()).await {
                Ok(LoginOutcome::Accepted) => router.go(AppRoute::auth_success_redirect()),
                Ok(LoginOutcome::Rejected { .. }) => {
                    set_error_msg.try_set(Some("Invalid email or password".to_string()));
                }
                Err(e) => {
                    set_error_msg.try_set(Some(format!("Login failed: {}", e.message())));
                }
            }
            set_is_submitting.try_set(false);
        });
    };

    view! {
        <Show when=move || !is_checking.get() fallback=|| view! { <div class="flex items-center justify-center min-h-screen"><span class="loading loading-spinner loading-lg text-primary"></span></div> }>
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content flex-col w-full max-w-md">
                    <div class="text-center mb-4">
                        <h1 class="text-3xl font-bold">"Shop Admin"</h1>
                        <p class="text-base-content/70">"Sign in to manage the store"</p>
                    </div>

                    <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                        <form class="card-body" on:submit=on_submit>
                            <Show when=move || error_msg.get().is_some()>
                                <div role="alert" class="alert alert-error text-sm py-2">
                                    <span>{move || error_msg.get().unwrap_or_default()}</span>
                                </div>
                            </Show>

                            <div class="form-control">
                                <label class="label" for="email">
                                    <span class="label-text">"Email"</span>
                                </label>
                                <input
                                    id="email"
                                    type="email"
                                    placeholder="admin@shop.com"
                                    on:input=move |ev| set_email.set(event_target_value(&ev))
                                    prop:value=email
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control">
                                <label class="label" for="password">
                                    <span class="label-text">"Password"</span>
                                </label>
                                <input
                                    id="password"
                                    type="password"
                                    placeholder="••••••••"
                                    on:input=move |ev| set_password.set(event_target_value(&ev))
                                    prop:value=password
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control">
                                <label class="label cursor-pointer justify-start gap-2">
                                    <input
                                        type="checkbox"
                                        class="checkbox checkbox-sm"
                                        prop:checked=remember_me
                                        on:change=move |ev| set_remember_me.set(event_target_checked(&ev))
                                    />
                                    <span class="label-text">"Remember me"</span>
                                </label>
                            </div>
                            <div class="collapse collapse-arrow bg-base-200">
                                <input type="checkbox" />
                                <div class="collapse-title text-sm">"Server"</div>
                                <div class="collapse-content">
                                    <input
                                        id="backend-url"
                                        type="url"
                                        on:input=move |ev| set_backend_url.set(event_target_value(&ev))
                                        prop:value=backend_url
                                        class="input input-bordered input-sm w-full"
                                    />
                                </div>
                            </div>
                            <div class="form-control mt-6">
                                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                    {move || if is_submitting.get() {
                                        view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                    } else {
                                        "Sign in".into_any()
                                    }}
                                </button>
                            </div>
                        </form>
                    </div>
                </div>
            </div>
        </Show>
    }
}
