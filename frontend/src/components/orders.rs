mod order_details;
mod status_dialog;

use crate::auth::use_auth;
use crate::components::confirm_delete::ConfirmDelete;
use crate::components::layout::{Notification, Toast, notify_ok};
use crate::components::list::ListHandle;
use crate::components::pagination::Pagination;
use crate::web::FetchHttpClient;
use leptos::prelude::*;
use leptos::task::spawn_local;
use order_details::OrderDetails;
use shopadmin::dialog::{DeleteConfirmation, EditDialog};
use shopadmin::services::{OrderService, OrderSort, OrderSource, OrderStatusDraft};
use shopadmin_shared::date::{display_date, format_filter_date, parse_filter_date};
use shopadmin_shared::{Order, OrderStatus};
use status_dialog::StatusDialog;
use std::rc::Rc;

type Orders = ListHandle<OrderSource<FetchHttpClient>>;
type Service = StoredValue<Rc<OrderService<FetchHttpClient>>, LocalStorage>;

/// 状态徽章颜色
pub(crate) fn status_badge(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "badge badge-warning",
        OrderStatus::Processing => "badge badge-info",
        OrderStatus::Shipped => "badge badge-primary",
        OrderStatus::Delivered => "badge badge-success",
        OrderStatus::Canceled => "badge badge-error",
    }
}

#[component]
pub fn OrdersPage() -> impl IntoView {
    let auth = use_auth();
    let client = auth.client();

    let list: Orders = ListHandle::new(
        OrderSource::new(client.services.orders.clone()),
        client.config.default_page_size,
    );
    let service: Service = StoredValue::new_local(client.services.orders.clone());
    let page_size_options = client.config.page_size_options.clone();

    let details = RwSignal::new(EditDialog::<Order>::new());
    let status_dialog = RwSignal::new(EditDialog::<OrderStatusDraft>::new());
    let confirm = RwSignal::new(DeleteConfirmation::default());
    let notification: Notification = RwSignal::new(None);

    let on_save_status = move |()| {
        let submission = match status_dialog.try_update(|d| d.take_submission()) {
            Some(Ok(submission)) => submission,
            Some(Err(e)) => {
                status_dialog.update(|d| d.reject(&e));
                return;
            }
            None => return,
        };
        let (Some(controller), Some(service)) = (list.controller(), service.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let draft = submission.draft;
            let result = controller
                .save_and_refresh(service.update_status(&draft))
                .await;
            status_dialog.try_update(|d| d.complete(&result));
            match result {
                Ok(_) => notify_ok(notification, format!("Order #{} marked {}", draft.id, draft.status)),
                Err(e) => tracing::warn!(id = draft.id, error = %e, "order status update failed"),
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
                Ok(_) => notify_ok(notification, "Order deleted"),
                Err(e) => tracing::warn!(id, error = %e, "order delete failed"),
            }
        });
    };

    let rows = move || {
        list.snapshot.with(|s| {
            s.items
                .iter()
                .cloned()
                .map(|order| order_row(order, details, status_dialog, confirm))
                .collect_view()
        })
    };
    let is_empty = move || list.snapshot.with(|s| s.items.is_empty() && !s.loading);
    let last_error = move || list.snapshot.with(|s| s.last_error.clone());

    view! {
        <Toast notification=notification />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="p-6 pb-2">
                    <h3 class="card-title">"Orders"</h3>
                    <p class="text-base-content/70 text-sm">"Track and update customer orders."</p>
                </div>

                <OrderFilters list=list />

                <Show when=move || last_error().is_some()>
                    <div role="alert" class="alert alert-warning mx-6 text-sm py-2">
                        <span>{move || last_error().unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"#"</th>
                                <th class="cursor-pointer" on:click=move |_| list.toggle_sort(OrderSort::Date)>
                                    "Date" {move || list.sort_indicator(OrderSort::Date)}
                                </th>
                                <th class="cursor-pointer" on:click=move |_| list.toggle_sort(OrderSort::Customer)>
                                    "Customer" {move || list.sort_indicator(OrderSort::Customer)}
                                </th>
                                <th>"Total"</th>
                                <th>"Status"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=is_empty>
                                <tr>
                                    <td colspan="6" class="text-center py-8 text-base-content/50">
                                        "No orders match the current filters."
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

        <OrderDetails dialog=details />
        <StatusDialog dialog=status_dialog on_save=on_save_status />
        <ConfirmDelete state=confirm entity="order" on_confirm=on_delete />
    }
}

fn order_row(
    order: Order,
    details: RwSignal<EditDialog<Order>>,
    status_dialog: RwSignal<EditDialog<OrderStatusDraft>>,
    confirm: RwSignal<DeleteConfirmation>,
) -> impl IntoView {
    let id = order.id;
    let status = order.status;
    let status_draft = OrderStatusDraft::from(&order);
    let date = display_date(&order.order_date);
    let customer = order.invoice.customer_name.clone();
    let total = format!("{:.2}", order.total());

    view! {
        <tr>
            <td class="font-mono text-sm">{id}</td>
            <td>{date}</td>
            <td class="font-bold">{customer}</td>
            <td>{total}</td>
            <td><span class=status_badge(status)>{status.as_str()}</span></td>
            <td class="text-right whitespace-nowrap">
                <button class="btn btn-ghost btn-xs" on:click=move |_| details.update(|d| d.open_view(&order))>
                    "Details"
                </button>
                <button class="btn btn-ghost btn-xs" on:click=move |_| status_dialog.update(|d| d.open_edit(&status_draft))>
                    "Status"
                </button>
                <button class="btn btn-ghost btn-xs text-error" on:click=move |_| confirm.update(|c| c.request(id))>
                    "Delete"
                </button>
            </td>
        </tr>
    }
}

/// 筛选栏：状态 + 起止日期
///
/// 起止日期颠倒时查询被拒绝，错误显示在表格上方。
#[component]
fn OrderFilters(list: Orders) -> impl IntoView {
    let filter = move || list.snapshot.with(|s| s.query.filter.clone());

    view! {
        <div class="flex flex-wrap items-end gap-2 px-6 pb-4">
            <label class="form-control">
                <div class="label py-1">
                    <span class="label-text text-xs">"Status"</span>
                </div>
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| {
                        let status = OrderStatus::parse(&event_target_value(&ev));
                        list.update_filter(move |f| f.status = status);
                    }
                >
                    <option value="">"All"</option>
                    {move || {
                        let selected = filter().status;
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
            </label>
            <label class="form-control">
                <div class="label py-1">
                    <span class="label-text text-xs">"From"</span>
                </div>
                <input
                    type="date"
                    class="input input-bordered input-sm"
                    prop:value=move || filter().start_date.map(format_filter_date).unwrap_or_default()
                    on:change=move |ev| {
                        let date = parse_filter_date(&event_target_value(&ev));
                        list.update_filter(move |f| f.start_date = date);
                    }
                />
            </label>
            <label class="form-control">
                <div class="label py-1">
                    <span class="label-text text-xs">"To"</span>
                </div>
                <input
                    type="date"
                    class="input input-bordered input-sm"
                    prop:value=move || filter().end_date.map(format_filter_date).unwrap_or_default()
                    on:change=move |ev| {
                        let date = parse_filter_date(&event_target_value(&ev));
                        list.update_filter(move |f| f.end_date = date);
                    }
                />
            </label>
        </div>
    }
}
