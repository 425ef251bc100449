use leptos::prelude::*;

/// 分页条：上一页/下一页、页码、每页条数
#[component]
pub fn Pagination(
    /// 当前页（从 0 开始）
    #[prop(into)]
    page: Signal<usize>,
    #[prop(into)] total_pages: Signal<u64>,
    #[prop(into)] total_items: Signal<u64>,
    /// 当前显示的条目范围（从 1 开始）
    #[prop(into)]
    range: Signal<Option<(u64, u64)>>,
    #[prop(into)] page_size: Signal<usize>,
    options: Vec<usize>,
    #[prop(into)] on_page: Callback<usize>,
    #[prop(into)] on_page_size: Callback<usize>,
) -> impl IntoView {
    let has_previous = move || page.get() > 0;
    let has_next = move || (page.get() as u64 + 1) < total_pages.get();

    let summary = move || match range.get() {
        Some((start, end)) => format!("{}-{} of {}", start, end, total_items.get()),
        None => "No results".to_string(),
    };

    view! {
        <div class="flex flex-wrap items-center justify-between gap-4 p-4">
            <span class="text-sm text-base-content/70">{summary}</span>
            <div class="flex items-center gap-2">
                <label class="text-sm" for="page-size">"Rows per page"</label>
                <select
                    id="page-size"
                    class="select select-bordered select-sm"
                    on:change=move |ev| {
                        if let Ok(size) = event_target_value(&ev).parse::<usize>() {
                            on_page_size.run(size);
                        }
                    }
                >
                    {options
                        .into_iter()
                        .map(|size| {
                            view! {
                                <option value=size.to_string() selected=move || page_size.get() == size>
                                    {size.to_string()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <div class="join">
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !has_previous()
                        on:click=move |_| on_page.run(page.get_untracked().saturating_sub(1))
                    >
                        "«"
                    </button>
                    <button class="join-item btn btn-sm btn-disabled">
                        {move || format!("Page {} / {}", page.get() + 1, total_pages.get().max(1))}
                    </button>
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !has_next()
                        on:click=move |_| on_page.run(page.get_untracked() + 1)
                    >
                        "»"
                    </button>
                </div>
            </div>
        </div>
    }
}
