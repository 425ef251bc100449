//! 首页仪表盘
//!
//! 数据来自 `DashboardService`，这里只做表格和进度条展示。

use crate::auth::use_auth;
use crate::web::FetchHttpClient;
use leptos::prelude::*;
use leptos::task::spawn_local;
use shopadmin::services::{DashboardService, DashboardSnapshot, MonthlyRow};
use std::rc::Rc;

type Service = StoredValue<Rc<DashboardService<FetchHttpClient>>, LocalStorage>;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let service: Service = StoredValue::new_local(auth.client().services.dashboard.clone());

    // None 表示首次加载中
    let snapshot = RwSignal::new(Option::<DashboardSnapshot>::None);
    let (is_switching, set_is_switching) = signal(false);

    spawn_local(async move {
        let Some(service) = service.try_get_value() else {
            return;
        };
        let loaded = service.load(None).await;
        snapshot.try_set(Some(loaded));
    });

    let on_category = move |ev: leptos::ev::Event| {
        let category_id = event_target_value(&ev).parse::<i64>().ok();
        let (Some(service), Some(mut current)) = (service.try_get_value(), snapshot.get_untracked())
        else {
            return;
        };
        set_is_switching.set(true);
        spawn_local(async move {
            service.select_category(&mut current, category_id).await;
            snapshot.try_set(Some(current));
            set_is_switching.try_set(false);
        });
    };

    let data = move || snapshot.get();

    view! {
        {move || match data() {
            None => view! {
                <div class="flex justify-center py-16">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any(),
            Some(snapshot) => dashboard_body(snapshot, is_switching, on_category).into_any(),
        }}
    }
}

fn dashboard_body(
    snapshot: DashboardSnapshot,
    is_switching: ReadSignal<bool>,
    on_category: impl Fn(leptos::ev::Event) + 'static,
) -> impl IntoView {
    let total_products: u64 = snapshot.product_counts.iter().map(|c| c.product_count).sum();
    let best_seller = snapshot
        .top_selling
        .first()
        .map(|p| p.product_name.clone())
        .unwrap_or_else(|| "-".to_string());
    let series = snapshot.monthly_series();
    let selected = snapshot.selected_category;
    let errors = snapshot.errors.clone();

    let category_options = snapshot
        .main_categories
        .iter()
        .map(|category| {
            let children = snapshot
                .hierarchy
                .get(&category.id)
                .map(|names| format!(" ({})", names.join(", ")))
                .unwrap_or_default();
            view! {
                <option value=category.id.to_string() selected={selected == Some(category.id)}>
                    {format!("{}{}", category.name, children)}
                </option>
            }
        })
        .collect_view();

    view! {
        <div class="space-y-8">
            {(!errors.is_empty()).then(|| view! {
                <div role="alert" class="alert alert-warning text-sm">
                    <div>
                        <p class="font-semibold">"Some dashboard sections failed to load"</p>
                        <ul class="list-disc ml-4">
                            {errors.into_iter().map(|e| view! { <li>{e}</li> }).collect_view()}
                        </ul>
                    </div>
                </div>
            })}

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"Products"</div>
                    <div class="stat-value text-primary">{total_products}</div>
                    <div class="stat-desc">"In the selected categories"</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Main categories"</div>
                    <div class="stat-value text-secondary">{snapshot.main_categories.len()}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Best seller"</div>
                    <div class="stat-value text-2xl">{best_seller}</div>
                </div>
            </div>

            <div class="flex items-center gap-2">
                <select class="select select-bordered select-sm" on:change=on_category>
                    <option value="">"All categories"</option>
                    {category_options}
                </select>
                <Show when=move || is_switching.get()>
                    <span class="loading loading-spinner loading-sm"></span>
                </Show>
            </div>

            <div class="grid grid-cols-1 lg:grid-cols-2 gap-8">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Products per category"</h3>
                        <table class="table table-sm">
                            <tbody>
                                {snapshot.product_counts.into_iter().map(|c| view! {
                                    <tr>
                                        <td>{c.category_name}</td>
                                        <td class="text-right">{c.product_count}</td>
                                    </tr>
                                }).collect_view()}
                            </tbody>
                        </table>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Sales share"</h3>
                        {snapshot.sales_percentages.into_iter().map(|s| view! {
                            <div class="text-sm">
                                <div class="flex justify-between">
                                    <span>{s.category_name}</span>
                                    <span>{format!("{:.1}%", s.percentage)}</span>
                                </div>
                                <progress class="progress progress-primary w-full" value=s.percentage.to_string() max="100"></progress>
                            </div>
                        }).collect_view()}
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Top selling products"</h3>
                        <ol class="list-decimal ml-5 space-y-1">
                            {snapshot.top_selling.into_iter().map(|p| view! {
                                <li class="flex justify-between">
                                    <span>{p.product_name}</span>
                                    <span class="badge badge-ghost">{p.sales_count}</span>
                                </li>
                            }).collect_view()}
                        </ol>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Monthly sales"</h3>
                        <div class="overflow-x-auto">
                            <table class="table table-sm">
                                <thead>
                                    <tr>
                                        <th>"Month"</th>
                                        {series.iter().map(|name| view! { <th class="text-right">{name.clone()}</th> }).collect_view()}
                                    </tr>
                                </thead>
                                <tbody>
                                    {snapshot.monthly.into_iter().map(|row| monthly_row(row, &series)).collect_view()}
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

/// 缺失的分类按 0 显示
fn monthly_row(row: MonthlyRow, series: &[String]) -> impl IntoView + use<> {
    let label = row.month_name().map(str::to_string).unwrap_or_else(|| row.month.clone());
    let cells = series
        .iter()
        .map(|name| {
            let count = row.sales.get(name).copied().unwrap_or(0);
            view! { <td class="text-right">{count}</td> }
        })
        .collect_view();
    view! {
        <tr>
            <td>{label}</td>
            {cells}
        </tr>
    }
}
