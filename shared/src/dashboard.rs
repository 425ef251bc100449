//! 仪表盘统计接口的响应模型

use serde::{Deserialize, Serialize};

/// 各分类下的商品数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductCount {
    pub category_name: String,
    pub product_count: u64,
}

/// 各分类的销量占比（百分比）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySalesPercentage {
    pub category_name: String,
    pub percentage: f64,
}

/// 畅销商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_name: String,
    pub sales_count: u64,
}

/// 按月、按主分类统计的销量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCategorySales {
    /// 1..=12
    pub month: u32,
    pub category: String,
    pub sales_count: u64,
}

/// 仪表盘统计接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardReport {
    ProductCountByCategory,
    ProductSalesPercentage,
    TopSellingProducts,
    MonthlySalesByCategory,
}

impl DashboardReport {
    pub fn path_segment(&self) -> &'static str {
        match self {
            DashboardReport::ProductCountByCategory => "product-count-by-category",
            DashboardReport::ProductSalesPercentage => "product-sales-percentage",
            DashboardReport::TopSellingProducts => "top-selling-products",
            DashboardReport::MonthlySalesByCategory => "monthly-sales-by-category",
        }
    }
}
