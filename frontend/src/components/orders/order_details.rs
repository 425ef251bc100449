//! 订单详情（只读）：收货地址、发票、订单明细

use super::status_badge;
use leptos::prelude::*;
use shopadmin::dialog::EditDialog;
use shopadmin_shared::date::display_date;
use shopadmin_shared::{Invoice, Order, OrderItem, ShippingAddress};

fn field(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="flex justify-between gap-4 text-sm">
            <span class="text-base-content/60">{label}</span>
            <span class="text-right">{value}</span>
        </div>
    }
}

fn address_section(address: ShippingAddress) -> impl IntoView {
    view! {
        <div class="space-y-1">
            <h4 class="font-semibold">"Shipping address"</h4>
            {field("Name", address.name)}
            {field("Phone", address.phone_number)}
            {field("Email", address.email)}
            {field("Street", address.street)}
            {field("City", format!("{} {}", address.zip_code, address.city))}
            {field("Country", address.country)}
        </div>
    }
}

fn invoice_section(invoice: Invoice) -> impl IntoView {
    view! {
        <div class="space-y-1">
            <h4 class="font-semibold">"Invoice"</h4>
            {field("Customer", invoice.customer_name)}
            {field("Email", invoice.customer_email)}
            {field("Phone", invoice.customer_phone_number)}
            {field("Address", format!(
                "{}, {} {}, {}",
                invoice.customer_street, invoice.customer_zip_code, invoice.customer_city, invoice.customer_country
            ))}
            {field("Issued", display_date(&invoice.creation_date))}
            {field("Payment", invoice.payment_method.name)}
        </div>
    }
}

fn item_row(item: OrderItem) -> impl IntoView {
    // 商品可能已被删除，只剩下 id
    let name = item
        .product
        .map(|p| p.name)
        .unwrap_or_else(|| format!("Product #{}", item.product_id));
    let subtotal = item.ordered_price * item.amount as f64;
    view! {
        <tr>
            <td>{name}</td>
            <td class="text-right">{item.amount}</td>
            <td class="text-right">{format!("{:.2}", item.ordered_price)}</td>
            <td class="text-right">{format!("{:.2}", subtotal)}</td>
        </tr>
    }
}

fn order_body(order: Order) -> impl IntoView {
    let total = format!("{:.2}", order.total());
    let date = display_date(&order.order_date);
    view! {
        <div class="flex items-center gap-2 text-sm">
            <span>{date}</span>
            <span class=status_badge(order.status)>{order.status.as_str()}</span>
        </div>
        <div class="grid grid-cols-1 md:grid-cols-2 gap-6 my-4">
            {address_section(order.shipping_address)}
            {invoice_section(order.invoice)}
        </div>
        <table class="table table-sm w-full">
            <thead>
                <tr>
                    <th>"Product"</th>
                    <th class="text-right">"Qty"</th>
                    <th class="text-right">"Price"</th>
                    <th class="text-right">"Subtotal"</th>
                </tr>
            </thead>
            <tbody>
                {order.order_items.into_iter().map(item_row).collect_view()}
            </tbody>
            <tfoot>
                <tr>
                    <th colspan="3" class="text-right">"Total"</th>
                    <th class="text-right">{total}</th>
                </tr>
            </tfoot>
        </table>
    }
}

#[component]
pub fn OrderDetails(dialog: RwSignal<EditDialog<Order>>) -> impl IntoView {
    let title = move || dialog.with(|d| d.draft().map(|o| format!("Order #{}", o.id)).unwrap_or_default());

    view! {
        <div class=move || if dialog.with(|d| d.is_open()) { "modal modal-open" } else { "modal" }>
            <div class="modal-box w-11/12 max-w-4xl">
                <h3 class="font-bold text-lg">{title}</h3>
                {move || dialog.with(|d| d.draft().cloned()).map(order_body)}
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| dialog.update(|d| d.close())>
                        "Close"
                    </button>
                </div>
            </div>
        </div>
    }
}
