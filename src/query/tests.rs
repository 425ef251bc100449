use super::*;
use futures::channel::oneshot;
use std::cell::Cell;
use std::collections::VecDeque;

// =========================================================
// 测试数据源
// =========================================================

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: i64,
    price: f64,
}

impl Identified for Row {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RowSort {
    #[default]
    Id,
    Price,
}

impl SortField for RowSort {
    fn as_param(&self) -> &'static str {
        match self {
            RowSort::Id => "id",
            RowSort::Price => "price",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct RowFilter {
    min_price: Option<f64>,
}

impl FilterParams for RowFilter {
    fn append_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(min) = self.min_price {
            params.push(("minPrice", min.to_string()));
        }
    }
}

/// 在内存中模拟后端的筛选、排序和分页
struct FixtureSource {
    rows: RefCell<Vec<Row>>,
    fail: Cell<bool>,
    log: RefCell<Vec<Vec<(&'static str, String)>>>,
}

impl FixtureSource {
    fn with_rows(count: i64) -> Rc<Self> {
        Rc::new(Self {
            rows: RefCell::new(
                (1..=count)
                    .map(|id| Row {
                        id,
                        price: (id * 10) as f64,
                    })
                    .collect(),
            ),
            fail: Cell::new(false),
            log: RefCell::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.log.borrow().len()
    }

    fn remove(&self, id: i64) {
        self.rows.borrow_mut().retain(|r| r.id != id);
    }
}

#[async_trait::async_trait(?Send)]
impl ListSource for FixtureSource {
    type Item = Row;
    type Sort = RowSort;
    type Filter = RowFilter;

    async fn fetch(&self, query: &ListQuery<RowSort, RowFilter>) -> AdminResult<PaginatedResult<Row>> {
        self.log.borrow_mut().push(query.to_params());
        if self.fail.get() {
            return Err(AdminError::network("connection refused"));
        }

        let mut rows: Vec<Row> = self
            .rows
            .borrow()
            .iter()
            .filter(|r| query.filter.min_price.is_none_or(|min| r.price >= min))
            .cloned()
            .collect();
        match query.sort_by {
            RowSort::Id => rows.sort_by_key(|r| r.id),
            RowSort::Price => rows.sort_by(|a, b| a.price.total_cmp(&b.price)),
        }
        if query.sort_direction == SortDirection::Desc {
            rows.reverse();
        }

        let total_items = rows.len() as u64;
        let total_pages = total_items.div_ceil(query.page_size as u64);
        let items = rows
            .into_iter()
            .skip(query.page * query.page_size)
            .take(query.page_size)
            .collect();
        Ok(PaginatedResult {
            total_items,
            total_pages,
            current_page: query.page as u64 + 1,
            items,
        })
    }
}

type PendingPage = oneshot::Receiver<AdminResult<PaginatedResult<Row>>>;

/// 响应由测试手动放行，用于模拟乱序到达
struct GatedSource {
    pending: RefCell<VecDeque<PendingPage>>,
}

#[async_trait::async_trait(?Send)]
impl ListSource for GatedSource {
    type Item = Row;
    type Sort = RowSort;
    type Filter = RowFilter;

    async fn fetch(&self, _query: &ListQuery<RowSort, RowFilter>) -> AdminResult<PaginatedResult<Row>> {
        let rx = self.pending.borrow_mut().pop_front();
        let rx = rx.ok_or_else(|| AdminError::network("no gated response queued"))?;
        rx.await
            .map_err(|_| AdminError::network("gate dropped"))?
    }
}

fn page_of(ids: &[i64], total_items: u64) -> PaginatedResult<Row> {
    PaginatedResult {
        total_items,
        total_pages: total_items.div_ceil(5),
        current_page: 1,
        items: ids
            .iter()
            .map(|&id| Row {
                id,
                price: id as f64,
            })
            .collect(),
    }
}

fn ids(snapshot: &SnapshotOf<FixtureSource>) -> Vec<i64> {
    snapshot.items.iter().map(|r| r.id).collect()
}

// =========================================================
// 参数序列化
// =========================================================

#[test]
fn test_params_are_one_based_and_skip_unset_filters() {
    let mut query: ListQuery<RowSort, RowFilter> = ListQuery::new(5);
    query.page = 2;
    assert_eq!(
        query.to_params(),
        vec![
            ("pageNumber", "3".to_string()),
            ("pageSize", "5".to_string()),
            ("sortBy", "id".to_string()),
            ("sortDirection", "asc".to_string()),
        ]
    );

    query.filter.min_price = Some(12.5);
    assert_eq!(query.to_params().last(), Some(&("minPrice", "12.5".to_string())));

    let unsorted: ListQuery<Unsorted, NoFilter> = ListQuery::new(10);
    assert_eq!(unsorted.to_params().len(), 2);
}

#[test]
fn test_last_page_index() {
    assert_eq!(last_page_index(0, 5), 0);
    assert_eq!(last_page_index(5, 5), 0);
    assert_eq!(last_page_index(6, 5), 1);
    assert_eq!(last_page_index(12, 5), 2);
}

// =========================================================
// 刷新与输入变化
// =========================================================

#[tokio::test]
async fn test_each_input_change_issues_exactly_one_fetch() {
    let source = FixtureSource::with_rows(12);
    let controller = ListController::new(source.clone(), 5);

    assert!(controller.refresh().await.is_applied());
    assert!(controller.set_page(1).await.is_applied());
    assert!(controller.set_sort(RowSort::Price, SortDirection::Desc).await.is_applied());
    assert_eq!(source.calls(), 3);

    // 未变化不查询
    assert!(matches!(
        controller.set_sort(RowSort::Price, SortDirection::Desc).await,
        RefreshOutcome::Unchanged
    ));
    assert_eq!(source.calls(), 3);
    // 排序变化回到第一页
    assert_eq!(controller.query().page, 0);
}

#[tokio::test]
async fn test_filter_change_shows_expected_count() {
    let source = FixtureSource::with_rows(12);
    let controller = ListController::new(source.clone(), 5);
    controller.set_page(2).await;
    assert_eq!(controller.snapshot().items.len(), 2);

    // 价格 >= 50 剩 8 条，回到第 0 页
    controller
        .update_filter(|f| f.min_price = Some(50.0))
        .await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.query.page, 0);
    assert_eq!(snapshot.total_items, 8);
    let expected = |page: u64| 5u64.min(snapshot.total_items - page * 5) as usize;
    assert_eq!(snapshot.items.len(), expected(0));

    controller.set_page(1).await;
    assert_eq!(controller.snapshot().items.len(), 3);
    assert_eq!(controller.snapshot().showing_range(), Some((6, 8)));
}

#[tokio::test]
async fn test_price_desc_first_page() {
    let source = FixtureSource::with_rows(12);
    let controller = ListController::new(source.clone(), 5);
    controller.set_sort(RowSort::Price, SortDirection::Desc).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.items.len(), 5);
    assert_eq!(snapshot.total_pages, 3);
    assert!(snapshot.items.windows(2).all(|w| w[0].price > w[1].price));
    assert!(snapshot.has_next());
    assert!(!snapshot.has_previous());
}

#[tokio::test]
async fn test_zero_page_size_is_rejected_without_fetch() {
    let source = FixtureSource::with_rows(3);
    let controller = ListController::new(source.clone(), 5);
    let outcome = controller.set_page_size(0).await;
    assert!(matches!(outcome, RefreshOutcome::Failed(ref e) if e.status == crate::error::AdminErrorStatus::InvalidInput));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_rows() {
    let source = FixtureSource::with_rows(7);
    let controller = ListController::new(source.clone(), 5);
    controller.refresh().await;
    assert_eq!(ids(&controller.snapshot()), vec![1, 2, 3, 4, 5]);

    source.fail.set(true);
    let outcome = controller.set_page(1).await;
    assert!(matches!(outcome, RefreshOutcome::Failed(_)));

    let snapshot = controller.snapshot();
    assert_eq!(ids(&snapshot), vec![1, 2, 3, 4, 5]);
    assert!(!snapshot.loading);
    assert!(snapshot.last_error.is_some());

    source.fail.set(false);
    controller.refresh().await;
    assert_eq!(ids(&controller.snapshot()), vec![6, 7]);
    assert!(controller.snapshot().last_error.is_none());
}

// =========================================================
// 乱序响应
// =========================================================

#[tokio::test]
async fn test_out_of_order_response_never_overwrites_newer_state() {
    let (tx_old, rx_old) = oneshot::channel();
    let (tx_new, rx_new) = oneshot::channel();
    let source = Rc::new(GatedSource {
        pending: RefCell::new(VecDeque::from([rx_old, rx_new])),
    });
    let controller = ListController::new(source, 5);

    let older = controller.set_filter(RowFilter {
        min_price: Some(1.0),
    });
    let newer = controller.set_filter(RowFilter {
        min_price: Some(2.0),
    });
    let deliver = async {
        // 新请求先返回，旧请求后返回
        let _ = tx_new.send(Ok(page_of(&[20, 21], 2)));
        let _ = tx_old.send(Ok(page_of(&[10, 11, 12], 3)));
    };

    let (older, newer, _) = futures::join!(older, newer, deliver);
    assert!(matches!(older, RefreshOutcome::Superseded));
    assert!(newer.is_applied());

    let snapshot = controller.snapshot();
    assert_eq!(
        snapshot.items.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![20, 21]
    );
    assert_eq!(snapshot.query.filter.min_price, Some(2.0));
    assert!(!snapshot.loading);
}

// =========================================================
// 删除与保存
// =========================================================

#[tokio::test]
async fn test_deleting_only_row_on_last_page_clamps_back() {
    let source = FixtureSource::with_rows(6);
    let controller = ListController::new(source.clone(), 5);
    controller.set_page(1).await;
    assert_eq!(ids(&controller.snapshot()), vec![6]);

    let backend = source.clone();
    let outcome = controller
        .delete_and_refresh(6, async move {
            backend.remove(6);
            Ok(())
        })
        .await
        .unwrap();
    assert!(outcome.is_applied());

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.query.page, 0);
    assert_eq!(ids(&snapshot), vec![1, 2, 3, 4, 5]);
    assert_eq!(snapshot.total_items, 5);
    // 第 1 页查询 + 回退后的第 0 页查询
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_delete_removes_row_before_refresh_resolves() {
    let source = FixtureSource::with_rows(3);
    let controller = ListController::new(source.clone(), 5);
    controller.refresh().await;

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    controller.subscribe(move |s: &SnapshotOf<FixtureSource>| {
        sink.borrow_mut().push(s.items.iter().map(|r| r.id).collect::<Vec<_>>())
    });

    let backend = source.clone();
    controller
        .delete_and_refresh(2, async move {
            backend.remove(2);
            Ok(())
        })
        .await
        .unwrap();

    // 第一次通知即为本地移除后的结果
    assert_eq!(seen.borrow()[0], vec![1, 3]);
    assert_eq!(ids(&controller.snapshot()), vec![1, 3]);
}

#[tokio::test]
async fn test_failed_delete_changes_nothing() {
    let source = FixtureSource::with_rows(3);
    let controller = ListController::new(source.clone(), 5);
    controller.refresh().await;

    let err = controller
        .delete_and_refresh(2, async { Err(AdminError::rejected(409, "in use")) })
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), Some(409));
    assert_eq!(ids(&controller.snapshot()), vec![1, 2, 3]);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_save_refreshes_current_query() {
    let source = FixtureSource::with_rows(6);
    let controller = ListController::new(source.clone(), 5);
    controller.set_page(1).await;

    let backend = source.clone();
    controller
        .save_and_refresh(async move {
            backend.rows.borrow_mut().push(Row { id: 7, price: 70.0 });
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(controller.query().page, 1);
    assert_eq!(ids(&controller.snapshot()), vec![6, 7]);
}
