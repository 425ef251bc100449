use leptos::prelude::*;
use shopadmin::dialog::EditDialog;
use shopadmin::services::OrderStatusDraft;
use shopadmin_shared::OrderStatus;

#[component]
pub fn StatusDialog(
    dialog: RwSignal<EditDialog<OrderStatusDraft>>,
    #[prop(into)] on_save: Callback<()>,
) -> impl IntoView {
    let submitting = move || dialog.with(|d| d.is_submitting());
    let error = move || dialog.with(|d| d.error().map(str::to_string));
    let current = move || dialog.with(|d| d.draft().map(|s| s.status));
    let order_id = move || dialog.with(|d| d.draft().map(|s| s.id).unwrap_or_default());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        on_save.run(());
    };

    view! {
        <div class=move || if dialog.with(|d| d.is_open()) { "modal modal-open" } else { "modal" }>
            <div class="modal-box">
                <h3 class="font-bold text-lg">"Update Order #" {order_id}</h3>
                <form on:submit=on_submit class="space-y-2">
                    <Show when=move || error().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <span>{move || error().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    <select
                        class="select select-bordered w-full"
                        disabled=submitting
                        on:change=move |ev| {
                            let Some(status) = OrderStatus::parse(&event_target_value(&ev)) else {
                                return;
                            };
                            dialog.update(|d| {
                                if let Some(draft) = d.draft_mut() {
                                    draft.status = status;
                                }
                            });
                        }
                    >
                        {move || {
                            let selected = current();
                            OrderStatus::ALL
                                .into_iter()
                                .map(|status| {
                                    view! {
                                        <option value=status.as_str() selected={selected == Some(status)}>
                                            {status.as_str()}
                                        </option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>

                    <div class="modal-action">
                        <button
                            type="button"
                            class="btn"
                            disabled=submitting
                            on:click=move |_| dialog.update(|d| d.close())
                        >
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=submitting>
                            {move || if submitting() {
                                view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                            } else {
                                "Save".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
