use crate::api::BackendClient;
use crate::dialog::Draft;
use crate::error::{AdminError, AdminResult};
use crate::query::{FilterParams, ListQuery, ListSource, SortField};
use crate::request::HttpClient;
use chrono::NaiveDate;
use shopadmin_shared::date::format_filter_date;
use shopadmin_shared::protocol::{DeleteOrderRequest, ListOrdersRequest, UpdateOrderStatusRequest};
use shopadmin_shared::{Order, OrderStatus, PaginatedResult};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    Date,
    Customer,
}

impl SortField for OrderSort {
    fn as_param(&self) -> &'static str {
        match self {
            OrderSort::Date => "date",
            OrderSort::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl OrderFilter {
    /// 起止日期颠倒时拒绝
    pub fn validate(&self) -> AdminResult<()> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(AdminError::invalid_input(
                "start date must not be after end date",
            )
            .in_op("order.filter")),
            _ => Ok(()),
        }
    }
}

impl FilterParams for OrderFilter {
    fn append_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(start) = self.start_date {
            params.push(("startDate", format_filter_date(start)));
        }
        if let Some(end) = self.end_date {
            params.push(("endDate", format_filter_date(end)));
        }
    }
}

/// 订单状态编辑草稿
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatusDraft {
    pub id: i64,
    pub status: OrderStatus,
}

impl Draft for OrderStatusDraft {
    fn id(&self) -> i64 {
        self.id
    }
}

impl From<&Order> for OrderStatusDraft {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
        }
    }
}

/// 订单详情对话框只读展示整单
impl Draft for Order {
    fn id(&self) -> i64 {
        self.id
    }
}

pub struct OrderService<C: HttpClient> {
    api: Rc<BackendClient<C>>,
}

impl<C: HttpClient> OrderService<C> {
    pub fn new(api: Rc<BackendClient<C>>) -> Self {
        Self { api }
    }

    pub async fn list(
        &self,
        query: &ListQuery<OrderSort, OrderFilter>,
    ) -> AdminResult<PaginatedResult<Order>> {
        query.filter.validate()?;
        let req = ListOrdersRequest {
            params: query.to_params(),
        };
        self.api
            .send(&req)
            .await
            .map_err(|e| e.in_op("order.list"))
    }

    pub async fn delete(&self, id: i64) -> AdminResult<()> {
        self.api
            .execute(&DeleteOrderRequest { id })
            .await
            .map(|_| ())
            .map_err(|e| e.in_op_with("order.delete", id.to_string()))
    }

    pub async fn update_status(&self, draft: &OrderStatusDraft) -> AdminResult<()> {
        if draft.id == 0 {
            return Err(AdminError::invalid_input("order id is required").in_op("order.status"));
        }
        let req = UpdateOrderStatusRequest {
            id: draft.id,
            new_status: draft.status,
        };
        self.api
            .execute(&req)
            .await
            .map(|_| ())
            .map_err(|e| e.in_op_with("order.status", draft.id.to_string()))
    }
}

pub struct OrderSource<C: HttpClient> {
    service: Rc<OrderService<C>>,
}

impl<C: HttpClient> OrderSource<C> {
    pub fn new(service: Rc<OrderService<C>>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> ListSource for OrderSource<C> {
    type Item = Order;
    type Sort = OrderSort;
    type Filter = OrderFilter;

    async fn fetch(
        &self,
        query: &ListQuery<OrderSort, OrderFilter>,
    ) -> AdminResult<PaginatedResult<Order>> {
        self.service.list(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminErrorStatus;
    use crate::query::{ListController, RefreshOutcome};
    use crate::request::{HttpMethod, MockHttpClient, RequestBody};
    use serde_json::json;

    fn service(mock: &Rc<MockHttpClient>) -> Rc<OrderService<Rc<MockHttpClient>>> {
        Rc::new(OrderService::new(Rc::new(
            BackendClient::new("https://shop.test", mock.clone()).unwrap(),
        )))
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_filter_params() {
        let filter = OrderFilter {
            status: Some(OrderStatus::Shipped),
            start_date: date(2024, 1, 5),
            end_date: None,
        };
        let mut params = Vec::new();
        filter.append_params(&mut params);
        assert_eq!(
            params,
            vec![
                ("status", "Shipped".to_string()),
                ("startDate", "2024-01-05".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_inverted_date_range_never_hits_backend() {
        let mock = Rc::new(MockHttpClient::new());
        let controller = ListController::new(Rc::new(OrderSource::new(service(&mock))), 5);

        let outcome = controller
            .set_filter(OrderFilter {
                status: None,
                start_date: date(2024, 3, 1),
                end_date: date(2024, 2, 1),
            })
            .await;
        match outcome {
            RefreshOutcome::Failed(e) => assert_eq!(e.status, AdminErrorStatus::InvalidInput),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(mock.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_with_status_filter() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Order?pageNumber=1&pageSize=5&sortBy=date&sortDirection=asc&status=Pending",
            200,
            json!({
                "totalItems": 1,
                "totalPages": 1,
                "currentPage": 1,
                "items": [{
                    "id": 11,
                    "status": "Pending",
                    "orderDate": "2024-05-01T10:00:00",
                    "orderItems": [{"productId": 1, "amount": 2, "orderedPrice": 9.5}],
                    "invoice": {"customerName": "Ana", "paymentMethod": {"id": 1, "name": "Card"}}
                }]
            }),
        );
        let controller = ListController::new(Rc::new(OrderSource::new(service(&mock))), 5);
        controller
            .update_filter(|f| f.status = Some(OrderStatus::Pending))
            .await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].invoice.customer_name, "Ana");
        assert_eq!(snapshot.items[0].total(), 19.0);
    }

    #[tokio::test]
    async fn test_update_status_body() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_status(HttpMethod::Put, "https://shop.test/api/Order/11/status", 204);

        service(&mock)
            .update_status(&OrderStatusDraft {
                id: 11,
                status: OrderStatus::Delivered,
            })
            .await
            .unwrap();

        assert_eq!(
            mock.requests.borrow()[0].body,
            RequestBody::Json(r#"{"newStatus":"Delivered"}"#.to_string())
        );
    }
}
