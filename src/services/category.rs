use crate::api::BackendClient;
use crate::dialog::Draft;
use crate::error::{AdminError, AdminResult};
use crate::query::{ListQuery, ListSource, NoFilter, Unsorted};
use crate::request::HttpClient;
use shopadmin_shared::protocol::{
    CreateCategoryRequest, DeleteCategoryRequest, ListCategoriesRequest, UpdateCategoryRequest,
};
use shopadmin_shared::{Category, PaginatedResult};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

// =========================================================
// 草稿与校验
// =========================================================

/// 分类编辑草稿
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryDraft {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl Draft for CategoryDraft {
    fn id(&self) -> i64 {
        self.id
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            parent_id: category.parent_id,
        }
    }
}

/// 可选的父分类（编辑时排除自身）
pub fn selectable_parents(all: &[Category], editing: Option<i64>) -> Vec<&Category> {
    all.iter().filter(|c| Some(c.id) != editing).collect()
}

/// 提交前校验：名称非空，父分类不能是自身或自身的后代
pub fn validate_draft(all: &[Category], draft: &CategoryDraft) -> AdminResult<()> {
    if draft.name.trim().is_empty() {
        return Err(AdminError::invalid_input("category name is required").in_op("category.validate"));
    }

    let Some(parent_id) = draft.parent_id else {
        return Ok(());
    };
    if draft.id == 0 {
        return Ok(());
    }
    if parent_id == draft.id {
        return Err(AdminError::invalid_input("a category cannot be its own parent")
            .in_op("category.validate"));
    }

    // 沿父链向上走，碰到自己就是环
    let mut seen = HashSet::new();
    let mut cursor = Some(parent_id);
    while let Some(id) = cursor {
        if id == draft.id {
            return Err(AdminError::invalid_input(
                "the selected parent is a descendant of this category",
            )
            .in_op_with("category.validate", id.to_string()));
        }
        if !seen.insert(id) {
            break;
        }
        cursor = all.iter().find(|c| c.id == id).and_then(|c| c.parent_id);
    }
    Ok(())
}

// =========================================================
// 服务
// =========================================================

pub struct CategoryService<C: HttpClient> {
    api: Rc<BackendClient<C>>,
}

impl<C: HttpClient> CategoryService<C> {
    pub fn new(api: Rc<BackendClient<C>>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> AdminResult<Vec<Category>> {
        self.api
            .send(&ListCategoriesRequest)
            .await
            .map_err(|e| e.in_op("category.list"))
    }

    pub async fn create(&self, name: &str, parent_id: Option<i64>) -> AdminResult<()> {
        let req = CreateCategoryRequest {
            name: name.trim().to_string(),
            parent_id,
        };
        self.api
            .execute(&req)
            .await
            .map(|_| ())
            .map_err(|e| e.in_op("category.create"))
    }

    pub async fn update(&self, id: i64, name: &str, parent_id: Option<i64>) -> AdminResult<()> {
        let req = UpdateCategoryRequest {
            id,
            name: name.trim().to_string(),
            parent_id,
        };
        self.api
            .execute(&req)
            .await
            .map(|_| ())
            .map_err(|e| e.in_op_with("category.update", id.to_string()))
    }

    /// 按 id 选择新建或更新
    pub async fn save(&self, draft: &CategoryDraft) -> AdminResult<()> {
        if draft.id == 0 {
            self.create(&draft.name, draft.parent_id).await
        } else {
            self.update(draft.id, &draft.name, draft.parent_id).await
        }
    }

    pub async fn delete(&self, id: i64) -> AdminResult<()> {
        self.api
            .execute(&DeleteCategoryRequest { id })
            .await
            .map(|_| ())
            .map_err(|e| e.in_op_with("category.delete", id.to_string()))
    }
}

// =========================================================
// 列表数据源
// =========================================================

/// 在内存中分页
pub fn paginate_local<T: Clone>(items: &[T], page: usize, page_size: usize) -> PaginatedResult<T> {
    let total_items = items.len() as u64;
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size as u64)
    };
    PaginatedResult {
        total_items,
        total_pages,
        current_page: page as u64 + 1,
        items: items
            .iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect(),
    }
}

/// 分类接口不分页，由客户端按后端顺序分页
///
/// 同时保留最近一次拿到的完整列表，供父分类下拉框使用。
pub struct CategorySource<C: HttpClient> {
    service: Rc<CategoryService<C>>,
    all: RefCell<Vec<Category>>,
}

impl<C: HttpClient> CategorySource<C> {
    pub fn new(service: Rc<CategoryService<C>>) -> Self {
        Self {
            service,
            all: RefCell::new(Vec::new()),
        }
    }

    pub fn all_categories(&self) -> Vec<Category> {
        self.all.borrow().clone()
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> ListSource for CategorySource<C> {
    type Item = Category;
    type Sort = Unsorted;
    type Filter = NoFilter;

    async fn fetch(
        &self,
        query: &ListQuery<Unsorted, NoFilter>,
    ) -> AdminResult<PaginatedResult<Category>> {
        let all = self.service.list().await?;
        let page = paginate_local(&all, query.page, query.page_size);
        *self.all.borrow_mut() = all;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminErrorStatus;
    use crate::query::ListController;
    use crate::request::{HttpMethod, HttpResponse, MockHttpClient, RequestBody};

    fn category(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        Category {
            id,
            name: name.into(),
            parent_id,
            children: None,
        }
    }

    fn tree() -> Vec<Category> {
        vec![
            category(1, "Jewelry", None),
            category(2, "Rings", Some(1)),
            category(3, "Gold Rings", Some(2)),
            category(4, "Watches", None),
        ]
    }

    /// 内存中的分类后端：POST 追加，GET 返回全部
    fn stateful_backend(mock: &MockHttpClient) {
        let store = Rc::new(RefCell::new(vec![category(1, "Jewelry", None)]));
        mock.mock_handler(move |req| {
            let url = req.url.as_str();
            match (req.method, url) {
                (HttpMethod::Get, "https://shop.test/api/Category") => Ok(HttpResponse {
                    status: 200,
                    body: serde_json::to_string(&*store.borrow())?,
                }),
                (HttpMethod::Post, "https://shop.test/api/Category") => {
                    let RequestBody::Json(body) = &req.body else {
                        return Ok(HttpResponse {
                            status: 400,
                            body: String::new(),
                        });
                    };
                    let dto: serde_json::Value = serde_json::from_str(body)?;
                    let mut rows = store.borrow_mut();
                    let id = rows.len() as i64 + 1;
                    rows.push(Category {
                        id,
                        name: dto["name"].as_str().unwrap_or_default().to_string(),
                        parent_id: dto["parentId"].as_i64(),
                        children: None,
                    });
                    Ok(HttpResponse {
                        status: 201,
                        body: String::new(),
                    })
                }
                _ => Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                }),
            }
        });
    }

    fn service(mock: &Rc<MockHttpClient>) -> Rc<CategoryService<Rc<MockHttpClient>>> {
        let api = BackendClient::new("https://shop.test", mock.clone()).unwrap();
        Rc::new(CategoryService::new(Rc::new(api)))
    }

    #[test]
    fn test_selectable_parents_exclude_self() {
        let all = tree();
        let ids: Vec<i64> = selectable_parents(&all, Some(2)).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(selectable_parents(&all, None).len(), 4);
    }

    #[test]
    fn test_cycle_check() {
        let all = tree();
        let mut draft = CategoryDraft::from(&all[1]);

        draft.parent_id = Some(3);
        let err = validate_draft(&all, &draft).unwrap_err();
        assert_eq!(err.status, AdminErrorStatus::InvalidInput);

        draft.parent_id = Some(2);
        assert!(validate_draft(&all, &draft).is_err());

        draft.parent_id = Some(4);
        assert!(validate_draft(&all, &draft).is_ok());

        draft.name = "   ".into();
        assert!(validate_draft(&all, &draft).is_err());
    }

    #[tokio::test]
    async fn test_create_root_category_lists_once_without_children() {
        let mock = Rc::new(MockHttpClient::new());
        stateful_backend(&mock);
        let service = service(&mock);

        service
            .save(&CategoryDraft {
                id: 0,
                name: "Necklaces".into(),
                parent_id: None,
            })
            .await
            .unwrap();

        let all = service.list().await.unwrap();
        let created: Vec<&Category> = all.iter().filter(|c| c.name == "Necklaces").collect();
        assert_eq!(created.len(), 1);
        assert!(created[0].is_root());
        assert!(created[0].children.as_ref().is_none_or(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_update_uses_put_with_id_in_path() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_status(HttpMethod::Put, "https://shop.test/api/Category/2", 204);
        let service = service(&mock);

        service
            .save(&CategoryDraft {
                id: 2,
                name: " Rings ".into(),
                parent_id: Some(1),
            })
            .await
            .unwrap();

        let reqs = mock.requests.borrow();
        assert_eq!(reqs[0].method, HttpMethod::Put);
        assert_eq!(
            reqs[0].body,
            RequestBody::Json(r#"{"name":"Rings","parentId":1}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_rejected_save_surfaces_status() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            HttpMethod::Post,
            "https://shop.test/api/Category",
            400,
            serde_json::json!({"errors": {"Name": ["required"]}}),
        );
        let err = service(&mock)
            .create("", None)
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(400));
        assert_eq!(err.status, AdminErrorStatus::Rejected);
    }

    #[tokio::test]
    async fn test_source_pages_client_side_in_backend_order() {
        let mock = Rc::new(MockHttpClient::new());
        let rows: Vec<Category> = (1..=7)
            .rev()
            .map(|id| category(id, &format!("c{id}"), None))
            .collect();
        mock.mock_response(
            HttpMethod::Get,
            "https://shop.test/api/Category",
            200,
            serde_json::to_value(&rows).unwrap(),
        );
        let source = Rc::new(CategorySource::new(service(&mock)));
        let controller = ListController::new(source.clone(), 5);

        controller.set_page(1).await;
        let snapshot = controller.snapshot();
        assert_eq!(
            snapshot.items.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert_eq!(snapshot.total_pages, 2);
        assert_eq!(source.all_categories().len(), 7);
        // 分类接口不带分页参数
        assert_eq!(mock.request_urls(), vec!["https://shop.test/api/Category"]);
    }
}
