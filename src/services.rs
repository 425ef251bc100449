//! 各实体的后端服务与列表数据源

pub mod category;
pub mod dashboard;
pub mod order;
pub mod product;

pub use category::{CategoryDraft, CategoryService, CategorySource};
pub use dashboard::{DashboardService, DashboardSnapshot, MonthlyRow};
pub use order::{OrderFilter, OrderService, OrderSort, OrderSource, OrderStatusDraft};
pub use product::{ProductDraft, ProductFilter, ProductService, ProductSort, ProductSource};

use crate::api::BackendClient;
use crate::request::HttpClient;
use std::rc::Rc;

/// 共享同一个后端客户端的全部服务
pub struct AdminServices<C: HttpClient> {
    pub categories: Rc<CategoryService<C>>,
    pub products: Rc<ProductService<C>>,
    pub orders: Rc<OrderService<C>>,
    pub dashboard: Rc<DashboardService<C>>,
}

impl<C: HttpClient> AdminServices<C> {
    pub fn new(api: Rc<BackendClient<C>>) -> Self {
        Self {
            categories: Rc::new(CategoryService::new(api.clone())),
            products: Rc::new(ProductService::new(api.clone())),
            orders: Rc::new(OrderService::new(api.clone())),
            dashboard: Rc::new(DashboardService::new(api)),
        }
    }
}

impl<C: HttpClient> Clone for AdminServices<C> {
    fn clone(&self) -> Self {
        Self {
            categories: self.categories.clone(),
            products: self.products.clone(),
            orders: self.orders.clone(),
            dashboard: self.dashboard.clone(),
        }
    }
}
