//! 后端 REST 接口的传输模型
//!
//! 所有 DTO 均为后端返回的不可变快照，字段按后端约定使用 camelCase。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub mod dashboard;
pub mod date;
pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 后端默认地址（本地开发环境）
pub const DEFAULT_BACKEND_URL: &str = "https://localhost:44315";

/// 商品保存接口中承载 JSON 的表单字段名
pub const PRODUCT_JSON_FIELD: &str = "productDtoJson";
/// 商品保存接口中承载图片的表单字段名
pub const PRODUCT_IMAGE_FIELD: &str = "image";

// =========================================================
// 会话 (Session)
// =========================================================

/// 已认证用户的最小记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub email: String,
}

// =========================================================
// 分页 (Pagination)
// =========================================================

/// 后端分页响应信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub total_items: u64,
    pub total_pages: u64,
    /// 后端页码，从 1 开始
    pub current_page: u64,
    pub items: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn empty() -> Self {
        Self {
            total_items: 0,
            total_pages: 0,
            current_page: 1,
            items: Vec::new(),
        }
    }
}

impl<T> Default for PaginatedResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Category>>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub serial_number: String,
    pub name: String,
    pub weight: f64,
    pub material: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category_names: BTreeSet<String>,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: 0,
            serial_number: String::new(),
            name: String::new(),
            weight: 0.0,
            material: String::new(),
            description: String::new(),
            price: 0.0,
            stock: 0,
            image_url: String::new(),
            category_names: BTreeSet::new(),
        }
    }
}

/// 随商品一起上传的图片
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub country: String,
    pub street: String,
    pub city: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    pub id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone_number: String,
    pub customer_zip_code: String,
    pub customer_country: String,
    pub customer_city: String,
    pub customer_street: String,
    pub creation_date: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    pub amount: i64,
    pub ordered_price: f64,
    #[serde(default)]
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    /// ISO 8601 字符串，后端可能不带时区
    pub order_date: String,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub invoice: Invoice,
}

impl Order {
    /// 订单总额（按下单时价格计算）
    pub fn total(&self) -> f64 {
        self.order_items
            .iter()
            .map(|item| item.ordered_price * item.amount as f64)
            .sum()
    }
}
