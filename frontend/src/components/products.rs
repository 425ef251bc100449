mod product_dialog;

use crate::auth::use_auth;
use crate::components::confirm_delete::ConfirmDelete;
use crate::components::layout::{Notification, Toast, notify_err, notify_ok};
use crate::components::list::ListHandle;
use crate::components::pagination::Pagination;
use crate::web::FetchHttpClient;
use leptos::prelude::*;
use leptos::task::spawn_local;
use product_dialog::ProductDialog;
use shopadmin::config::AdminConfig;
use shopadmin::dialog::{DeleteConfirmation, EditDialog, SubmitKind};
use shopadmin::services::{ProductDraft, ProductService, ProductSort, ProductSource};
use shopadmin_shared::{Category, Product};
use std::rc::Rc;

type Products = ListHandle<ProductSource<FetchHttpClient>>;
type Service = StoredValue<Rc<ProductService<FetchHttpClient>>, LocalStorage>;

/// 空字符串视为未设置
fn parse_optional_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

#[component]
pub fn ProductsPage() -> impl IntoView {
    let auth = use_auth();
    let client = auth.client();

    let list: Products = ListHandle::new(
        ProductSource::new(client.services.products.clone()),
        client.config.default_page_size,
    );
    let service: Service = StoredValue::new_local(client.services.products.clone());
    let config = StoredValue::new((*client.config).clone());
    let page_size_options = client.config.page_size_options.clone();

    let categories = RwSignal::new(Vec::<Category>::new());
    let dialog = RwSignal::new(EditDialog::<ProductDraft>::new());
    let confirm = RwSignal::new(DeleteConfirmation::default());
    let notification: Notification = RwSignal::new(None);

    // 分类用于筛选下拉框和编辑对话框
    let category_service = client.services.categories.clone();
    spawn_local(async move {
        match category_service.list().await {
            Ok(all) => {
                categories.try_set(all);
            }
            Err(e) => notify_err(notification, format!("Failed to load categories: {}", e.message())),
        }
    });

    let on_save = move |()| {
        let submission = match dialog.try_update(|d| d.take_submission()) {
            Some(Ok(submission)) => submission,
            Some(Err(e)) => {
                dialog.update(|d| d.reject(&e));
                return;
            }
            None => return,
        };
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
                        SubmitKind::Create => "Product created",
                        SubmitKind::Update => "Product updated",
                    },
                ),
                Err(e) => tracing::warn!(error = %e, "product save failed"),
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
                Ok(_) => notify_ok(notification, "Product deleted"),
                Err(e) => tracing::warn!(id, error = %e, "product delete failed"),
            }
        });
    };

    let rows = move || {
        list.snapshot.with(|s| {
            s.items
                .iter()
                .cloned()
                .map(|product| product_row(product, config, dialog, confirm))
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
                        <h3 class="card-title">"Products"</h3>
                        <p class="text-base-content/70 text-sm">"Manage the product catalogue."</p>
                    </div>
                    <button
                        class="btn btn-primary"
                        on:click=move |_| dialog.update(|d| d.open_create(ProductDraft::default()))
                    >
                        "Add Product"
                    </button>
                </div>

                <ProductFilters list=list categories=categories />

                <Show when=move || last_error().is_some()>
                    <div role="alert" class="alert alert-warning mx-6 text-sm py-2">
                        <span>{move || last_error().unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th></th>
                                <th>"Serial"</th>
                                <th class="cursor-pointer" on:click=move |_| list.toggle_sort(ProductSort::Name)>
                                    "Name" {move || list.sort_indicator(ProductSort::Name)}
                                </th>
                                <th class="cursor-pointer" on:click=move |_| list.toggle_sort(ProductSort::Price)>
                                    "Price" {move || list.sort_indicator(ProductSort::Price)}
                                </th>
                                <th>"Stock"</th>
                                <th class="hidden md:table-cell">"Material"</th>
                                <th class="hidden md:table-cell">"Categories"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=is_empty>
                                <tr>
                                    <td colspan="8" class="text-center py-8 text-base-content/50">
                                        "No products match the current filters."
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

        <ProductDialog dialog=dialog categories=categories config=config on_save=on_save />
        <ConfirmDelete state=confirm entity="product" on_confirm=on_delete />
    }
}

fn product_row(
    product: Product,
    config: StoredValue<AdminConfig>,
    dialog: RwSignal<EditDialog<ProductDraft>>,
    confirm: RwSignal<DeleteConfirmation>,
) -> impl IntoView {
    let id = product.id;
    let draft = ProductDraft::from(&product);
    let edit_draft = draft.clone();
    let image = (!product.image_url.is_empty())
        .then(|| config.with_value(|c| c.image_url(&product.image_url)));
    let category_names = product
        .category_names
        .iter()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    view! {
        <tr>
            <td>
                {image.map(|src| view! {
                    <div class="avatar">
                        <div class="mask mask-squircle h-10 w-10">
                            <img src=src alt="" />
                        </div>
                    </div>
                })}
            </td>
            <td class="font-mono text-sm">{product.serial_number}</td>
            <td class="font-bold">{product.name}</td>
            <td>{format!("{:.2}", product.price)}</td>
            <td>{product.stock}</td>
            <td class="hidden md:table-cell">{product.material}</td>
            <td class="hidden md:table-cell text-sm">{category_names}</td>
            <td class="text-right whitespace-nowrap">
                <button class="btn btn-ghost btn-xs" on:click=move |_| dialog.update(|d| d.open_view(&draft))>
                    "View"
                </button>
                <button class="btn btn-ghost btn-xs" on:click=move |_| dialog.update(|d| d.open_edit(&edit_draft))>
                    "Edit"
                </button>
                <button class="btn btn-ghost btn-xs text-error" on:click=move |_| confirm.update(|c| c.request(id))>
                    "Delete"
                </button>
            </td>
        </tr>
    }
}

/// 筛选栏：每次输入变化都触发一次查询
#[component]
fn ProductFilters(list: Products, categories: RwSignal<Vec<Category>>) -> impl IntoView {
    let filter = move || list.snapshot.with(|s| s.query.filter.clone());

    view! {
        <div class="flex flex-wrap gap-2 px-6 pb-4">
            <input
                type="search"
                placeholder="Search"
                class="input input-bordered input-sm"
                prop:value=move || filter().search
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    list.update_filter(move |f| f.search = value);
                }
            />
            <input
                type="number"
                placeholder="Min price"
                class="input input-bordered input-sm w-28"
                on:input=move |ev| {
                    let value = parse_optional_f64(&event_target_value(&ev));
                    list.update_filter(move |f| f.min_price = value);
                }
            />
            <input
                type="number"
                placeholder="Max price"
                class="input input-bordered input-sm w-28"
                on:input=move |ev| {
                    let value = parse_optional_f64(&event_target_value(&ev));
                    list.update_filter(move |f| f.max_price = value);
                }
            />
            <input
                type="text"
                placeholder="Material"
                class="input input-bordered input-sm w-32"
                prop:value=move || filter().material
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    list.update_filter(move |f| f.material = value);
                }
            />
            <select
                class="select select-bordered select-sm"
                on:change=move |ev| {
                    let value = event_target_value(&ev).parse::<i64>().ok();
                    list.update_filter(move |f| f.category = value);
                }
            >
                <option value="">"All categories"</option>
                {move || {
                    let selected = filter().category;
                    categories
                        .get()
                        .into_iter()
                        .map(|c| {
                            view! {
                                <option value=c.id.to_string() selected={selected == Some(c.id)}>
                                    {c.name}
                                </option>
                            }
                        })
                        .collect_view()
                }}
            </select>
        </div>
    }
}
