//! 仪表盘：四个统计接口与分类层级
//!
//! 各部分独立加载，某一部分失败只记录日志并留空，不影响其他部分。
//! 商品数量和销量占比随所选主分类过滤，畅销商品和月度销量始终是全局数据。

use crate::api::BackendClient;
use crate::error::AdminResult;
use crate::request::HttpClient;
use serde::de::DeserializeOwned;
use shopadmin_shared::Category;
use shopadmin_shared::dashboard::{
    CategoryProductCount, CategorySalesPercentage, DashboardReport, MonthlyCategorySales,
    ProductSales,
};
use shopadmin_shared::protocol::{DashboardRequest, ListCategoriesRequest};
use std::collections::BTreeMap;
use std::rc::Rc;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// 月度销量透视后的一行
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    /// 两位月份，如 "03"
    pub month: String,
    /// 主分类名 -> 销量
    pub sales: BTreeMap<String, u64>,
}

impl MonthlyRow {
    pub fn month_name(&self) -> Option<&'static str> {
        month_name(&self.month)
    }
}

/// "03" 或 "3" -> "March"
pub fn month_name(month: &str) -> Option<&'static str> {
    let n: usize = month.trim_start_matches('0').parse().ok()?;
    MONTH_NAMES.get(n.checked_sub(1)?).copied()
}

/// 把 (月份, 分类, 销量) 记录透视为按月份排序的行
pub fn pivot_monthly_sales(records: &[MonthlyCategorySales]) -> Vec<MonthlyRow> {
    let mut by_month: BTreeMap<u32, BTreeMap<String, u64>> = BTreeMap::new();
    for record in records {
        by_month
            .entry(record.month)
            .or_default()
            .insert(record.category.clone(), record.sales_count);
    }
    by_month
        .into_iter()
        .map(|(month, sales)| MonthlyRow {
            month: format!("{:02}", month),
            sales,
        })
        .collect()
}

/// 顶级分类（无父分类）
pub fn main_categories(all: &[Category]) -> Vec<Category> {
    all.iter().filter(|c| c.is_root()).cloned().collect()
}

/// 父分类 id -> 直接子分类名称
pub fn category_hierarchy(all: &[Category]) -> BTreeMap<i64, Vec<String>> {
    let mut hierarchy: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for category in all {
        if let Some(parent_id) = category.parent_id {
            hierarchy
                .entry(parent_id)
                .or_default()
                .push(category.name.clone());
        }
    }
    hierarchy
}

/// 仪表盘的完整数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub selected_category: Option<i64>,
    pub main_categories: Vec<Category>,
    pub hierarchy: BTreeMap<i64, Vec<String>>,
    pub product_counts: Vec<CategoryProductCount>,
    pub sales_percentages: Vec<CategorySalesPercentage>,
    pub top_selling: Vec<ProductSales>,
    pub monthly: Vec<MonthlyRow>,
    /// 加载失败的部分
    pub errors: Vec<String>,
}

impl DashboardSnapshot {
    /// 所有出现过的主分类名（月度图的系列）
    pub fn monthly_series(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .monthly
            .iter()
            .flat_map(|row| row.sales.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// 单个部分失败时记录并返回空
fn section<T: Default>(name: &str, result: AdminResult<T>, errors: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(section = name, error = %e, "dashboard section failed");
            errors.push(format!("{}: {}", name, e.message()));
            T::default()
        }
    }
}

pub struct DashboardService<C: HttpClient> {
    api: Rc<BackendClient<C>>,
}

impl<C: HttpClient> DashboardService<C> {
    pub fn new(api: Rc<BackendClient<C>>) -> Self {
        Self { api }
    }

    async fn report<T: DeserializeOwned>(
        &self,
        report: DashboardReport,
        category_id: Option<i64>,
    ) -> AdminResult<Vec<T>> {
        self.api
            .send(&DashboardRequest::<T>::new(report, category_id))
            .await
            .map_err(|e| e.in_op_with("dashboard.report", report.path_segment()))
    }

    pub async fn product_count_by_category(
        &self,
        category_id: Option<i64>,
    ) -> AdminResult<Vec<CategoryProductCount>> {
        self.report(DashboardReport::ProductCountByCategory, category_id)
            .await
    }

    pub async fn product_sales_percentage(
        &self,
        category_id: Option<i64>,
    ) -> AdminResult<Vec<CategorySalesPercentage>> {
        self.report(DashboardReport::ProductSalesPercentage, category_id)
            .await
    }

    pub async fn top_selling_products(
        &self,
        category_id: Option<i64>,
    ) -> AdminResult<Vec<ProductSales>> {
        self.report(DashboardReport::TopSellingProducts, category_id)
            .await
    }

    pub async fn monthly_sales_by_category(
        &self,
        category_id: Option<i64>,
    ) -> AdminResult<Vec<MonthlyCategorySales>> {
        self.report(DashboardReport::MonthlySalesByCategory, category_id)
            .await
    }

    /// 首次加载全部部分
    pub async fn load(&self, category_id: Option<i64>) -> DashboardSnapshot {
        let (categories, counts, percentages, top, monthly) = futures::join!(
            self.api.send(&ListCategoriesRequest),
            self.product_count_by_category(category_id),
            self.product_sales_percentage(category_id),
            self.top_selling_products(None),
            self.monthly_sales_by_category(None),
        );

        let mut errors = Vec::new();
        let categories = section("categories", categories, &mut errors);
        let product_counts = section("product count", counts, &mut errors);
        let sales_percentages = section("sales percentage", percentages, &mut errors);
        let top_selling = section("top selling", top, &mut errors);
        let monthly = section("monthly sales", monthly, &mut errors);

        DashboardSnapshot {
            selected_category: category_id,
            main_categories: main_categories(&categories),
            hierarchy: category_hierarchy(&categories),
            product_counts,
            sales_percentages,
            top_selling,
            monthly: pivot_monthly_sales(&monthly),
            errors,
        }
    }

    /// 切换主分类：只重新加载随分类过滤的两个部分
    pub async fn select_category(&self, snapshot: &mut DashboardSnapshot, category_id: Option<i64>) {
        let (counts, percentages) = futures::join!(
            self.product_count_by_category(category_id),
            self.product_sales_percentage(category_id),
        );
        let mut errors = Vec::new();
        snapshot.product_counts = section("product count", counts, &mut errors);
        snapshot.sales_percentages = section("sales percentage", percentages, &mut errors);
        snapshot.selected_category = category_id;
        snapshot.errors = errors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpMethod, MockHttpClient};
    use serde_json::json;

    fn service(mock: &Rc<MockHttpClient>) -> DashboardService<Rc<MockHttpClient>> {
        DashboardService::new(Rc::new(
            BackendClient::new("https://shop.test", mock.clone()).unwrap(),
        ))
    }

    fn sale(month: u32, category: &str, sales_count: u64) -> MonthlyCategorySales {
        MonthlyCategorySales {
            month,
            category: category.into(),
            sales_count,
        }
    }

    #[test]
    fn test_pivot_sorts_and_pads_months() {
        let rows = pivot_monthly_sales(&[
            sale(11, "Rings", 4),
            sale(2, "Rings", 1),
            sale(11, "Watches", 7),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "02");
        assert_eq!(rows[0].month_name(), Some("February"));
        assert_eq!(rows[1].month, "11");
        assert_eq!(rows[1].sales.get("Watches"), Some(&7));
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name("12"), Some("December"));
        assert_eq!(month_name("00"), None);
        assert_eq!(month_name("13"), None);
    }

    #[test]
    fn test_hierarchy() {
        let all: Vec<Category> = serde_json::from_value(json!([
            {"id": 1, "name": "Jewelry", "parentId": null},
            {"id": 2, "name": "Rings", "parentId": 1},
            {"id": 3, "name": "Necklaces", "parentId": 1},
            {"id": 4, "name": "Watches", "parentId": null}
        ]))
        .unwrap();
        assert_eq!(main_categories(&all).len(), 2);
        assert_eq!(
            category_hierarchy(&all).get(&1),
            Some(&vec!["Rings".to_string(), "Necklaces".to_string()])
        );
    }

    #[tokio::test]
    async fn test_failed_section_is_left_empty() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Category",
            200,
            json!([{"id": 1, "name": "Jewelry", "parentId": null}]),
        );
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Dashboard/product-count-by-category?categoryId=1",
            200,
            json!([{"categoryName": "Rings", "productCount": 4}]),
        );
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Dashboard/product-sales-percentage?categoryId=1",
            200,
            json!([{"categoryName": "Rings", "percentage": 100.0}]),
        );
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Dashboard/top-selling-products",
            200,
            json!([{"productName": "Ring", "salesCount": 9}]),
        );
        mock.mock_status(
            HttpMethod::Get,
            "https://shop.test/api/Dashboard/monthly-sales-by-category",
            500,
        );

        let snapshot = service(&mock).load(Some(1)).await;
        assert_eq!(snapshot.main_categories.len(), 1);
        assert_eq!(snapshot.product_counts[0].product_count, 4);
        assert_eq!(snapshot.top_selling[0].sales_count, 9);
        assert!(snapshot.monthly.is_empty());
        assert_eq!(snapshot.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_select_category_refreshes_filtered_sections_only() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Dashboard/product-count-by-category?categoryId=4",
            200,
            json!([{"categoryName": "Watches", "productCount": 2}]),
        );
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Dashboard/product-sales-percentage?categoryId=4",
            200,
            json!([]),
        );
        let service = service(&mock);
        let mut snapshot = DashboardSnapshot {
            top_selling: vec![ProductSales {
                product_name: "Ring".into(),
                sales_count: 9,
            }],
            ..DashboardSnapshot::default()
        };

        service.select_category(&mut snapshot, Some(4)).await;

        assert_eq!(snapshot.selected_category, Some(4));
        assert_eq!(snapshot.product_counts[0].category_name, "Watches");
        assert_eq!(snapshot.top_selling.len(), 1);
        assert_eq!(mock.requests.borrow().len(), 2);
    }
}
