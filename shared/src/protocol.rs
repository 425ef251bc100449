use crate::dashboard::DashboardReport;
use crate::{AuthenticatedUser, Category, Order, OrderStatus, PaginatedResult, Product};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";
pub const PING_AUTH_PATH: &str = "/pingauth";
pub const CATEGORY_API: &str = "/api/Category";
pub const PRODUCT_API: &str = "/api/Product";
pub const ORDER_API: &str = "/api/Order";
pub const DASHBOARD_API: &str = "/api/Dashboard";

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// The request value itself is the JSON body for `POST`/`PUT`; fields that belong in the
/// path or query string are `#[serde(skip)]`.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The URL path relative to the backend base URL.
    fn path(&self) -> String;

    /// Query string pairs, in order.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn has_body(&self) -> bool {
        matches!(Self::METHOD, HttpMethod::Post | HttpMethod::Put)
    }
}

// =========================================================
// Session
// =========================================================

/// Sign in. `remember_me` picks a persistent cookie over a session cookie.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub remember_me: bool,
}

impl ApiRequest for LoginRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        LOGIN_PATH.to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        if self.remember_me {
            vec![("useCookies", "true".to_string())]
        } else {
            vec![("useSessionCookies", "true".to_string())]
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest;

impl ApiRequest for LogoutRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        LOGOUT_PATH.to_string()
    }

    fn has_body(&self) -> bool {
        false
    }
}

/// Lightweight identity probe; `401` when the session cookie is missing or expired.
#[derive(Debug, Clone, Serialize)]
pub struct PingAuthRequest;

impl ApiRequest for PingAuthRequest {
    type Response = AuthenticatedUser;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        PING_AUTH_PATH.to_string()
    }
}

// =========================================================
// Categories
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListCategoriesRequest;

impl ApiRequest for ListCategoriesRequest {
    type Response = Vec<Category>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        CATEGORY_API.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub parent_id: Option<i64>,
}

impl ApiRequest for CreateCategoryRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        CATEGORY_API.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl ApiRequest for UpdateCategoryRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/{}", CATEGORY_API, self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCategoryRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for DeleteCategoryRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", CATEGORY_API, self.id)
    }
}

// =========================================================
// Products
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListProductsRequest {
    #[serde(skip)]
    pub params: Vec<(&'static str, String)>,
}

impl ApiRequest for ListProductsRequest {
    type Response = PaginatedResult<Product>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        PRODUCT_API.to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.params.clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteProductRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for DeleteProductRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", PRODUCT_API, self.id)
    }
}

/// Create-or-update target for the multipart product form: `POST` for new products,
/// `PUT /{id}` for existing ones.
pub fn product_save_target(id: i64) -> (HttpMethod, String) {
    if id == 0 {
        (HttpMethod::Post, PRODUCT_API.to_string())
    } else {
        (HttpMethod::Put, format!("{}/{}", PRODUCT_API, id))
    }
}

// =========================================================
// Orders
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListOrdersRequest {
    #[serde(skip)]
    pub params: Vec<(&'static str, String)>,
}

impl ApiRequest for ListOrdersRequest {
    type Response = PaginatedResult<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        ORDER_API.to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.params.clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOrderRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for DeleteOrderRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("{}/{}", ORDER_API, self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    #[serde(skip)]
    pub id: i64,
    pub new_status: OrderStatus,
}

impl ApiRequest for UpdateOrderStatusRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/{}/status", ORDER_API, self.id)
    }
}

// =========================================================
// Dashboard
// =========================================================

/// One dashboard report, optionally narrowed to a main category.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct DashboardRequest<T> {
    #[serde(skip)]
    pub report: DashboardReport,
    #[serde(skip)]
    pub category_id: Option<i64>,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> DashboardRequest<T> {
    pub fn new(report: DashboardReport, category_id: Option<i64>) -> Self {
        Self {
            report,
            category_id,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> ApiRequest for DashboardRequest<T> {
    type Response = Vec<T>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/{}", DASHBOARD_API, self.report.path_segment())
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self.category_id {
            Some(id) => vec![("categoryId", id.to_string())],
            None => Vec::new(),
        }
    }
}
