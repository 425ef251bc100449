use crate::api::BackendClient;
use crate::dialog::Draft;
use crate::error::{AdminError, AdminResult};
use crate::query::{FilterParams, ListQuery, ListSource, SortField};
use crate::request::{FormPart, FormValue, HttpClient};
use shopadmin_shared::protocol::{DeleteProductRequest, ListProductsRequest, product_save_target};
use shopadmin_shared::{PRODUCT_IMAGE_FIELD, PRODUCT_JSON_FIELD, PaginatedResult, Product, ProductImage};
use std::rc::Rc;

// =========================================================
// 查询参数
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Name,
    Price,
}

impl SortField for ProductSort {
    fn as_param(&self) -> &'static str {
        match self {
            ProductSort::Name => "name",
            ProductSort::Price => "price",
        }
    }
}

/// 商品筛选条件，未设置的条件不发送
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// 分类 id
    pub category: Option<i64>,
    pub material: String,
    pub search: String,
}

impl FilterParams for ProductFilter {
    fn append_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(min) = self.min_price {
            params.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("maxPrice", max.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("category", category.to_string()));
        }
        if !self.material.trim().is_empty() {
            params.push(("material", self.material.trim().to_string()));
        }
        if !self.search.trim().is_empty() {
            params.push(("searchString", self.search.trim().to_string()));
        }
    }
}

// =========================================================
// 草稿
// =========================================================

/// 商品草稿：完整商品 + 可选的新图片
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDraft {
    pub product: Product,
    pub image: Option<ProductImage>,
}

impl Draft for ProductDraft {
    fn id(&self) -> i64 {
        self.product.id
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            product: product.clone(),
            image: None,
        }
    }
}

impl ProductDraft {
    /// 切换某个分类的选中状态
    pub fn toggle_category(&mut self, name: &str) {
        if !self.product.category_names.remove(name) {
            self.product.category_names.insert(name.to_string());
        }
    }

    /// multipart 表单：JSON 字段 + 可选图片
    pub fn to_form(&self) -> AdminResult<Vec<FormPart>> {
        let json = serde_json::to_string(&self.product)
            .map_err(|e| AdminError::from(e).in_op("product.encode"))?;
        let mut parts = vec![FormPart {
            name: PRODUCT_JSON_FIELD.to_string(),
            value: FormValue::Text(json),
        }];
        if let Some(image) = &self.image {
            parts.push(FormPart {
                name: PRODUCT_IMAGE_FIELD.to_string(),
                value: FormValue::File {
                    file_name: image.file_name.clone(),
                    content_type: image.content_type.clone(),
                    bytes: image.bytes.clone(),
                },
            });
        }
        Ok(parts)
    }
}

// =========================================================
// 服务
// =========================================================

pub struct ProductService<C: HttpClient> {
    api: Rc<BackendClient<C>>,
}

impl<C: HttpClient> ProductService<C> {
    pub fn new(api: Rc<BackendClient<C>>) -> Self {
        Self { api }
    }

    pub async fn list(
        &self,
        query: &ListQuery<ProductSort, ProductFilter>,
    ) -> AdminResult<PaginatedResult<Product>> {
        let req = ListProductsRequest {
            params: query.to_params(),
        };
        self.api
            .send(&req)
            .await
            .map_err(|e| e.in_op("product.list"))
    }

    /// 新建用 POST，已有商品用 PUT /{id}
    pub async fn save(&self, draft: &ProductDraft) -> AdminResult<()> {
        let (method, path) = product_save_target(draft.product.id);
        let parts = draft.to_form()?;
        self.api
            .send_multipart(method, &path, parts)
            .await
            .map(|_| ())
            .map_err(|e| e.in_op_with("product.save", draft.product.id.to_string()))
    }

    pub async fn delete(&self, id: i64) -> AdminResult<()> {
        self.api
            .execute(&DeleteProductRequest { id })
            .await
            .map(|_| ())
            .map_err(|e| e.in_op_with("product.delete", id.to_string()))
    }
}

pub struct ProductSource<C: HttpClient> {
    service: Rc<ProductService<C>>,
}

impl<C: HttpClient> ProductSource<C> {
    pub fn new(service: Rc<ProductService<C>>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> ListSource for ProductSource<C> {
    type Item = Product;
    type Sort = ProductSort;
    type Filter = ProductFilter;

    async fn fetch(
        &self,
        query: &ListQuery<ProductSort, ProductFilter>,
    ) -> AdminResult<PaginatedResult<Product>> {
        self.service.list(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ListController, SortDirection};
    use crate::request::{HttpMethod, HttpResponse, MockHttpClient, RequestBody};
    use std::collections::HashMap;

    const BASE: &str = "https://shop.test";

    fn service(mock: &Rc<MockHttpClient>) -> Rc<ProductService<Rc<MockHttpClient>>> {
        Rc::new(ProductService::new(Rc::new(
            BackendClient::new(BASE, mock.clone()).unwrap(),
        )))
    }

    fn fixture(count: i64) -> Vec<Product> {
        (1..=count)
            .map(|id| Product {
                id,
                serial_number: format!("SN-{id}"),
                name: format!("Product {id:02}"),
                // 价格故意与 id 顺序不同
                price: ((id * 37) % 101) as f64 + 0.5,
                stock: id,
                material: if id % 2 == 0 { "Gold" } else { "Silver" }.into(),
                ..Product::default()
            })
            .collect()
    }

    /// 按查询参数在内存中排序分页的商品后端
    fn product_backend(mock: &MockHttpClient, products: Vec<Product>) {
        mock.mock_handler(move |req| {
            let url = url::Url::parse(&req.url)?;
            if req.method != HttpMethod::Get || url.path() != "/api/Product" {
                return Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                });
            }
            let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
            let number = |key: &str| params.get(key).and_then(|v| v.parse::<usize>().ok());
            let page_number = number("pageNumber").unwrap_or(1);
            let page_size = number("pageSize").unwrap_or(10);

            let mut rows: Vec<Product> = products
                .iter()
                .filter(|p| params.get("material").is_none_or(|m| &p.material == m))
                .cloned()
                .collect();
            match params.get("sortBy").map(String::as_str) {
                Some("price") => rows.sort_by(|a, b| a.price.total_cmp(&b.price)),
                _ => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            }
            if params.get("sortDirection").map(String::as_str) == Some("desc") {
                rows.reverse();
            }

            let total_items = rows.len() as u64;
            let page = PaginatedResult {
                total_items,
                total_pages: total_items.div_ceil(page_size as u64),
                current_page: page_number as u64,
                items: rows
                    .into_iter()
                    .skip((page_number - 1) * page_size)
                    .take(page_size)
                    .collect(),
            };
            Ok(HttpResponse {
                status: 200,
                body: serde_json::to_string(&page)?,
            })
        });
    }

    #[test]
    fn test_filter_params_omit_unset() {
        let mut filter = ProductFilter::default();
        let mut params = Vec::new();
        filter.append_params(&mut params);
        assert!(params.is_empty());

        filter.min_price = Some(10.0);
        filter.category = Some(3);
        filter.search = "  ring ".into();
        filter.append_params(&mut params);
        assert_eq!(
            params,
            vec![
                ("minPrice", "10".to_string()),
                ("category", "3".to_string()),
                ("searchString", "ring".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_price_desc_first_page_against_fixture() {
        let mock = Rc::new(MockHttpClient::new());
        product_backend(&mock, fixture(12));
        let source = Rc::new(ProductSource::new(service(&mock)));
        let controller = ListController::new(source, 5);

        controller
            .set_sort(ProductSort::Price, SortDirection::Desc)
            .await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.items.len(), 5);
        assert_eq!(snapshot.total_pages, 3);
        assert!(snapshot.items.windows(2).all(|w| w[0].price > w[1].price));
        assert_eq!(
            mock.request_urls(),
            vec!["https://shop.test/api/Product?pageNumber=1&pageSize=5&sortBy=price&sortDirection=desc"]
        );
    }

    #[tokio::test]
    async fn test_material_filter_count() {
        let mock = Rc::new(MockHttpClient::new());
        product_backend(&mock, fixture(12));
        let controller = ListController::new(Rc::new(ProductSource::new(service(&mock))), 5);

        controller
            .update_filter(|f| f.material = "Gold".into())
            .await;
        controller.set_page(1).await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.total_items, 6);
        assert_eq!(snapshot.items.len(), 1);
        assert!(snapshot.items.iter().all(|p| p.material == "Gold"));
    }

    #[tokio::test]
    async fn test_save_sends_multipart_to_create_or_update() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_status(HttpMethod::Post, "https://shop.test/api/Product", 201);
        mock.mock_status(HttpMethod::Put, "https://shop.test/api/Product/5", 204);
        let service = service(&mock);

        let mut draft = ProductDraft::default();
        draft.product.name = "Ring".into();
        draft.toggle_category("Rings");
        draft.image = Some(ProductImage {
            file_name: "ring.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        });
        service.save(&draft).await.unwrap();

        let mut existing = ProductDraft::from(&fixture(5)[4]);
        existing.product.stock = 0;
        service.save(&existing).await.unwrap();

        let reqs = mock.requests.borrow();
        assert_eq!(reqs[0].method, HttpMethod::Post);
        let RequestBody::Multipart(parts) = &reqs[0].body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts[0].name, "productDtoJson");
        let FormValue::Text(json) = &parts[0].value else {
            panic!("expected text part");
        };
        let sent: Product = serde_json::from_str(json).unwrap();
        assert_eq!(sent.name, "Ring");
        assert!(sent.category_names.contains("Rings"));
        assert_eq!(parts[1].name, "image");

        assert_eq!(reqs[1].method, HttpMethod::Put);
        assert_eq!(reqs[1].url, "https://shop.test/api/Product/5");
        let RequestBody::Multipart(parts) = &reqs[1].body else {
            panic!("expected multipart body");
        };
        // 未选新图片时只有 JSON 字段
        assert_eq!(parts.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_status(HttpMethod::Delete, "https://shop.test/api/Product/3", 500);
        let err = service(&mock).delete(3).await.unwrap_err();
        assert_eq!(err.http_status(), Some(500));
    }
}
