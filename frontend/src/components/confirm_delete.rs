use leptos::prelude::*;
use shopadmin::dialog::DeleteConfirmation;

/// 删除确认对话框
///
/// 只持有待删除的 id；取消不会发出任何请求，失败时保持打开并显示错误。
#[component]
pub fn ConfirmDelete(
    state: RwSignal<DeleteConfirmation>,
    /// 实体名称，用于提示文案
    entity: &'static str,
    /// 确认后执行删除（参数为 id）
    #[prop(into)]
    on_confirm: Callback<i64>,
) -> impl IntoView {
    let busy = move || state.with(|s| s.in_flight());
    let error = move || state.with(|s| s.error().map(str::to_string));

    let confirm = move |_| {
        if let Some(id) = state.try_update(|s| s.confirm()).flatten() {
            on_confirm.run(id);
        }
    };

    view! {
        <div class=move || if state.with(|s| s.is_open()) { "modal modal-open" } else { "modal" }>
            <div class="modal-box">
                <h3 class="font-bold text-lg">{format!("Delete {}", entity)}</h3>
                <p class="py-4">
                    {move || format!(
                        "Are you sure you want to delete {} #{}? This cannot be undone.",
                        entity,
                        state.with(|s| s.pending().unwrap_or_default()),
                    )}
                </p>
                <Show when=move || error().is_some()>
                    <div role="alert" class="alert alert-error text-sm py-2">
                        <span>{move || error().unwrap_or_default()}</span>
                    </div>
                </Show>
                <div class="modal-action">
                    <button class="btn" disabled=busy on:click=move |_| state.update(|s| s.cancel())>
                        "Cancel"
                    </button>
                    <button class="btn btn-error" disabled=busy on:click=confirm>
                        {move || if busy() {
                            view! { <span class="loading loading-spinner"></span> "Deleting..." }.into_any()
                        } else {
                            "Delete".into_any()
                        }}
                    </button>
                </div>
            </div>
        </div>
    }
}
