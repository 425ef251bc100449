use crate::auth::use_auth;
use crate::components::confirm_delete::ConfirmDelete;
use crate::components::layout::{Notification, Toast, notify_ok};
use crate::components::list::ListHandle;
use crate::components::pagination::Pagination;
use crate::web::FetchHttpClient;
use leptos::prelude::*;
use leptos::task::spawn_local;
use shopadmin::dialog::{DeleteConfirmation, DialogMode, EditDialog, SubmitKind};
use shopadmin::services::category::{selectable_parents, validate_draft};
use shopadmin::services::{CategoryDraft, CategoryService, CategorySource};
use shopadmin_shared::Category;
use std::rc::Rc;

type DialogState = RwSignal<EditDialog<CategoryDraft>>;

#[component]
pub fn CategoriesPage() -> impl IntoView {
    let auth = use_auth();
    let client = auth.client();

    let source = Rc::new(CategorySource::new(client.services.categories.clone()));
    let list = ListHandle::shared(source.clone(), client.config.default_page_size);
    let source = StoredValue::new_local(source);
    let service: StoredValue<Rc<CategoryService<FetchHttpClient>>, LocalStorage> =
        StoredValue::new_local(client.services.categories.clone());
    let page_size_options = client.config.page_size_options.clone();

    // 完整分类列表：父分类下拉框、父分类名称、环检查都依赖它
    let all = RwSignal::new(Vec::<Category>::new());
    Effect::new(move |_| {
        list.snapshot.track();
        if let Some(source) = source.try_get_value() {
            all.set(source.all_categories());
        }
    });

    let dialog: DialogState = RwSignal::new(EditDialog::new());
    let confirm = RwSignal::new(DeleteConfirmation::default());
    let notification: Notification = RwSignal::new(None);

    let on_save = move |()| {
        let submission = match dialog.try_update(|d| d.take_submission()) {
            Some(Ok(submission)) => submission,
            Some(Err(e)) => {
                dialog.update(|d| d.reject(&e));
                return;
            }
            None => return,
        };
        if let Err(e) = all.with_untracked(|all| validate_draft(all, &submission.draft)) {
            dialog.update(|d| d.reject(&e));
            return;
        }
        let (Some(controller), Some(service)) = (list.controller(), service.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let result = controller
                .save_and_refresh(service.save(&submission.draft))
                .await;
            dialog.try_update(|d| d.complete(&result));
            match result {
                Ok(_) => notify_ok(
                    notification,
                    match submission.kind {
                        SubmitKind::Create => "Category created",
                        SubmitKind::Update => "Category updated",
                    },
                ),
                Err(e) => tracing::warn!(error = %e, "category save failed"),
            }
        });
    };

    let on_delete = move |id: i64| {
        let (Some(controller), Some(service)) = (list.controller(), service.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let result = controller.delete_and_refresh(id, service.delete(id)).await;
            confirm.try_update(|c| c.complete(&result));
            match result {
                Ok(_) => notify_ok(notification, "Category deleted"),
                Err(e) => tracing::warn!(id, error = %e, "category delete failed"),
            }
        });
    };

    let parent_name = move |parent_id: Option<i64>| -> String {
        let Some(parent_id) = parent_id else {
            return "-".to_string();
        };
        all.with(|all| {
            all.iter()
                .find(|c| c.id == parent_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("#{}", parent_id))
        })
    };

    let rows = move || {
        list.snapshot.with(|s| {
            s.items
                .iter()
                .map(|category| {
                    let id = category.id;
                    let draft = CategoryDraft::from(category);
                    let parent = parent_name(category.parent_id);
                    view! {
                        <tr>
                            <td class="font-bold">{category.name.clone()}</td>
                            <td>{parent}</td>
                            <td class="text-right whitespace-nowrap">
                                <button class="btn btn-ghost btn-xs" on:click=move |_| dialog.update(|d| d.open_edit(&draft))>
                                    "Edit"
                                </button>
                                <button class="btn btn-ghost btn-xs text-error" on:click=move |_| confirm.update(|c| c.request(id))>
                                    "Delete"
                                </button>
                            </td>
                        </tr>
                    }
                })
                .collect_view()
        })
    };
    let is_empty = move || list.snapshot.with(|s| s.items.is_empty() && !s.loading);
    let last_error = move || list.snapshot.with(|s| s.last_error.clone());

    view! {
        <Toast notification=notification />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="flex items-center justify-between p-6 pb-2">
                    <div>
                        <h3 class="card-title">"Categories"</h3>
                        <p class="text-base-content/70 text-sm">"Organise products into a category tree."</p>
                    </div>
                    <button
                        class="btn btn-primary"
                        on:click=move |_| dialog.update(|d| d.open_create(CategoryDraft::default()))
                    >
                        "Add Category"
                    </button>
                </div>

                <Show when=move || last_error().is_some()>
                    <div role="alert" class="alert alert-warning mx-6 text-sm py-2">
                        <span>{move || last_error().unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Parent"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=is_empty>
                                <tr>
                                    <td colspan="3" class="text-center py-8 text-base-content/50">
                                        "No categories yet."
                                    </td>
                                </tr>
                            </Show>
                            {rows}
                        </tbody>
                    </table>
                </div>

                <Pagination
                    page=Signal::derive(move || list.snapshot.with(|s| s.query.page))
                    total_pages=Signal::derive(move || list.snapshot.with(|s| s.total_pages))
                    total_items=Signal::derive(move || list.snapshot.with(|s| s.total_items))
                    range=Signal::derive(move || list.snapshot.with(|s| s.showing_range()))
                    page_size=Signal::derive(move || list.snapshot.with(|s| s.query.page_size))
                    options=page_size_options
                    on_page=move |page| list.set_page(page)
                    on_page_size=move |size| list.set_page_size(size)
                />
            </div>
        </div>

        <CategoryDialog dialog=dialog all=all on_save=on_save />
        <ConfirmDelete state=confirm entity="category" on_confirm=on_delete />
    }
}

/// 分类新建/编辑对话框：名称 + 父分类（不能选自身）
#[component]
fn CategoryDialog(
    dialog: DialogState,
    all: RwSignal<Vec<Category>>,
    #[prop(into)] on_save: Callback<()>,
) -> impl IntoView {
    let editable = move || dialog.with(|d| d.is_editable());
    let submitting = move || dialog.with(|d| d.is_submitting());
    let error = move || dialog.with(|d| d.error().map(str::to_string));
    let title = move || match dialog.with(|d| d.mode()) {
        Some(DialogMode::Edit) => "Edit Category",
        _ => "Add Category",
    };

    let edit = move |apply: Box<dyn FnOnce(&mut CategoryDraft)>| {
        dialog.update(|d| {
            if let Some(draft) = d.draft_mut() {
                apply(draft);
            }
        });
    };

    let parent_options = move || {
        let (editing, selected) = dialog.with(|d| {
            let draft = d.draft();
            (
                draft.map(|c| c.id).filter(|id| *id != 0),
                draft.and_then(|c| c.parent_id),
            )
        });
        all.with(|all| {
            selectable_parents(all, editing)
                .into_iter()
                .map(|c| {
                    view! {
                        <option value=c.id.to_string() selected={selected == Some(c.id)}>
                            {c.name.clone()}
                        </option>
                    }
                })
                .collect_view()
        })
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        on_save.run(());
    };

    view! {
        <div class=move || if dialog.with(|d| d.is_open()) { "modal modal-open" } else { "modal" }>
            <div class="modal-box">
                <h3 class="font-bold text-lg">{title}</h3>
                <form on:submit=on_submit class="space-y-2">
                    <Show when=move || error().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <span>{move || error().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    <label class="form-control w-full">
                        <div class="label">
                            <span class="label-text">"Name"</span>
                        </div>
                        <input
                            type="text"
                            class="input input-bordered w-full"
                            disabled=move || !editable()
                            prop:value=move || dialog.with(|d| d.draft().map(|c| c.name.clone()).unwrap_or_default())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                edit(Box::new(move |draft| draft.name = value));
                            }
                        />
                    </label>

                    <label class="form-control w-full">
                        <div class="label">
                            <span class="label-text">"Parent category"</span>
                        </div>
                        <select
                            class="select select-bordered w-full"
                            disabled=move || !editable()
                            on:change=move |ev| {
                                let parent_id = event_target_value(&ev).parse::<i64>().ok();
                                edit(Box::new(move |draft| draft.parent_id = parent_id));
                            }
                        >
                            <option value="">"None (main category)"</option>
                            {parent_options}
                        </select>
                    </label>

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
