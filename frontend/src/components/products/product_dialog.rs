//! 商品新建/编辑/查看对话框
//!
//! 对话框状态（模式、草稿、提交中、错误）全部在 `EditDialog` 里，
//! 这里只负责把字段绑定到草稿上。

use crate::web::{read_image, selected_file};
use leptos::prelude::*;
use leptos::task::spawn_local;
use shopadmin::config::AdminConfig;
use shopadmin::dialog::{DialogMode, EditDialog};
use shopadmin::services::ProductDraft;
use shopadmin_shared::{Category, Product};

type DialogState = RwSignal<EditDialog<ProductDraft>>;

fn edit(dialog: DialogState, apply: impl FnOnce(&mut ProductDraft)) {
    dialog.update(|d| {
        if let Some(draft) = d.draft_mut() {
            apply(draft);
        }
    });
}

/// 绑定到商品某个字段的输入框
///
/// 在 change（失焦/回车）时写回草稿：数字字段逐键写回会把 "1." 之类的中间输入格式化掉。
fn product_field(
    dialog: DialogState,
    label: &'static str,
    input_type: &'static str,
    get: fn(&Product) -> String,
    set: fn(&mut Product, String),
) -> impl IntoView {
    let editable = move || dialog.with(|d| d.is_editable());
    view! {
        <label class="form-control w-full">
            <div class="label">
                <span class="label-text">{label}</span>
            </div>
            <input
                type=input_type
                step="any"
                class="input input-bordered w-full"
                disabled=move || !editable()
                prop:value=move || dialog.with(|d| d.draft().map(|p| get(&p.product)).unwrap_or_default())
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    edit(dialog, |draft| set(&mut draft.product, value));
                }
            />
        </label>
    }
}

#[component]
pub fn ProductDialog(
    dialog: DialogState,
    categories: RwSignal<Vec<Category>>,
    config: StoredValue<AdminConfig>,
    #[prop(into)] on_save: Callback<()>,
) -> impl IntoView {
    let editable = move || dialog.with(|d| d.is_editable());
    let read_only = move || dialog.with(|d| d.is_read_only());
    let submitting = move || dialog.with(|d| d.is_submitting());
    let error = move || dialog.with(|d| d.error().map(str::to_string));

    let title = move || match dialog.with(|d| d.mode()) {
        Some(DialogMode::Create) => "Add Product",
        Some(DialogMode::Edit) => "Edit Product",
        Some(DialogMode::View) | None => "Product Details",
    };

    // 新选的图片优先显示文件名，否则显示已有图片
    let image_preview = move || {
        dialog.with(|d| {
            let draft = d.draft()?;
            if let Some(image) = &draft.image {
                return Some(view! { <span class="text-sm">{image.file_name.clone()}</span> }.into_any());
            }
            if draft.product.image_url.is_empty() {
                return None;
            }
            let src = config.with_value(|c| c.image_url(&draft.product.image_url));
            Some(view! { <img class="max-h-32 rounded" src=src alt="" /> }.into_any())
        })
    };

    let on_file = move |ev: leptos::ev::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        let Some(file) = selected_file(&input) else {
            return;
        };
        spawn_local(async move {
            match read_image(file).await {
                Ok(image) => edit(dialog, |draft| draft.image = Some(image)),
                Err(e) => {
                    dialog.try_update(|d| d.reject(&e));
                }
            }
        });
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        on_save.run(());
    };

    let category_options = move || {
        categories
            .get()
            .into_iter()
            .map(|category| {
                let name = category.name.clone();
                let toggle_name = category.name.clone();
                view! {
                    <label class="label cursor-pointer justify-start gap-2">
                        <input
                            type="checkbox"
                            class="checkbox checkbox-sm"
                            disabled=move || !editable()
                            prop:checked=move || dialog.with(|d| {
                                d.draft().is_some_and(|p| p.product.category_names.contains(&name))
                            })
                            on:change=move |_| {
                                let name = toggle_name.clone();
                                edit(dialog, move |draft| draft.toggle_category(&name));
                            }
                        />
                        <span class="label-text">{category.name}</span>
                    </label>
                }
            })
            .collect_view()
    };

    view! {
        <div class=move || if dialog.with(|d| d.is_open()) { "modal modal-open" } else { "modal" }>
            <div class="modal-box w-11/12 max-w-3xl">
                <h3 class="font-bold text-lg">{title}</h3>
                <form on:submit=on_submit class="space-y-2">
                    <Show when=move || error().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <span>{move || error().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    <div class="grid grid-cols-1 md:grid-cols-2 gap-2">
                        {product_field(dialog, "Serial number", "text", |p| p.serial_number.clone(), |p, v| p.serial_number = v)}
                        {product_field(dialog, "Name", "text", |p| p.name.clone(), |p, v| p.name = v)}
                        {product_field(dialog, "Price", "number", |p| p.price.to_string(), |p, v| {
                            if let Ok(price) = v.parse() {
                                p.price = price;
                            }
                        })}
                        {product_field(dialog, "Stock", "number", |p| p.stock.to_string(), |p, v| {
                            if let Ok(stock) = v.parse() {
                                p.stock = stock;
                            }
                        })}
                        {product_field(dialog, "Weight", "number", |p| p.weight.to_string(), |p, v| {
                            if let Ok(weight) = v.parse() {
                                p.weight = weight;
                            }
                        })}
                        {product_field(dialog, "Material", "text", |p| p.material.clone(), |p, v| p.material = v)}
                    </div>

                    <label class="form-control">
                        <div class="label">
                            <span class="label-text">"Description"</span>
                        </div>
                        <textarea
                            class="textarea textarea-bordered h-20"
                            disabled=move || !editable()
                            prop:value=move || dialog.with(|d| d.draft().map(|p| p.product.description.clone()).unwrap_or_default())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                edit(dialog, |draft| draft.product.description = value);
                            }
                        ></textarea>
                    </label>

                    <div class="form-control">
                        <div class="label">
                            <span class="label-text">"Categories"</span>
                        </div>
                        <div class="flex flex-wrap gap-x-4">{category_options}</div>
                    </div>

                    <div class="form-control">
                        <div class="label">
                            <span class="label-text">"Image"</span>
                        </div>
                        {image_preview}
                        <Show when=editable>
                            <input
                                type="file"
                                accept="image/*"
                                class="file-input file-input-bordered file-input-sm w-full"
                                on:change=on_file
                            />
                        </Show>
                    </div>

                    <div class="modal-action">
                        <button
                            type="button"
                            class="btn"
                            disabled=submitting
                            on:click=move |_| dialog.update(|d| d.close())
                        >
                            {move || if read_only() { "Close" } else { "Cancel" }}
                        </button>
                        <Show when=move || !read_only()>
                            <button type="submit" class="btn btn-primary" disabled=submitting>
                                {move || if submitting() {
                                    view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                                } else {
                                    "Save".into_any()
                                }}
                            </button>
                        </Show>
                    </div>
                </form>
            </div>
        </div>
    }
}
