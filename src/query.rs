//! 列表查询控制器
//!
//! 把分页、排序、筛选参数与一次后端查询绑定：
//! - 任何输入变化都会针对完整参数集发起恰好一次查询（不做防抖）
//! - 每次查询携带递增的代号，只有最新一次的响应会被应用
//! - 查询失败时保留旧数据
//! - 非首页返回空结果时，回退到最后一个非空页并重新查询一次

use crate::error::{AdminError, AdminResult};
use shopadmin_shared::{Category, Order, PaginatedResult, Product};
use std::cell::RefCell;
use std::fmt::Debug;
use std::future::Future;
use std::rc::Rc;

#[cfg(test)]
mod tests;

// =========================================================
// 查询参数
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// 可排序字段
pub trait SortField: Copy + Default + PartialEq + Debug + 'static {
    /// 后端的 `sortBy` 取值；空字符串表示不排序
    fn as_param(&self) -> &'static str;
}

/// 实体筛选条件
pub trait FilterParams: Clone + Default + PartialEq + Debug + 'static {
    /// 追加已设置的筛选参数，未设置的条件不出现在查询串中
    fn append_params(&self, params: &mut Vec<(&'static str, String)>);
}

/// 不支持排序的列表（保持后端顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unsorted;

impl SortField for Unsorted {
    fn as_param(&self) -> &'static str {
        ""
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoFilter;

impl FilterParams for NoFilter {
    fn append_params(&self, _params: &mut Vec<(&'static str, String)>) {}
}

/// 完整的查询参数集
///
/// `page` 从 0 开始，发往后端时转为从 1 开始的 `pageNumber`。
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<S, F> {
    pub page: usize,
    pub page_size: usize,
    pub sort_by: S,
    pub sort_direction: SortDirection,
    pub filter: F,
}

impl<S: SortField, F: FilterParams> ListQuery<S, F> {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size,
            sort_by: S::default(),
            sort_direction: SortDirection::default(),
            filter: F::default(),
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("pageNumber", (self.page + 1).to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        let sort_by = self.sort_by.as_param();
        if !sort_by.is_empty() {
            params.push(("sortBy", sort_by.to_string()));
            params.push(("sortDirection", self.sort_direction.as_param().to_string()));
        }
        self.filter.append_params(&mut params);
        params
    }
}

/// 最后一个非空页的下标（空列表为 0）
pub fn last_page_index(total_items: u64, page_size: usize) -> usize {
    if total_items == 0 || page_size == 0 {
        return 0;
    }
    ((total_items - 1) / page_size as u64) as usize
}

// =========================================================
// 数据源
// =========================================================

#[async_trait::async_trait(?Send)]
pub trait ListSource {
    type Item: Clone + 'static;
    type Sort: SortField;
    type Filter: FilterParams;

    async fn fetch(
        &self,
        query: &ListQuery<Self::Sort, Self::Filter>,
    ) -> AdminResult<PaginatedResult<Self::Item>>;
}

/// 有主键的行（用于删除后的本地移除）
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for Product {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Order {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Category {
    fn id(&self) -> i64 {
        self.id
    }
}

// =========================================================
// 快照
// =========================================================

/// 控制器对外暴露的只读状态
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T, S, F> {
    pub query: ListQuery<S, F>,
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub loading: bool,
    /// 最近一次失败的消息，成功后清空
    pub last_error: Option<String>,
}

impl<T, S, F> ListSnapshot<T, S, F> {
    pub fn has_previous(&self) -> bool {
        self.query.page > 0
    }

    pub fn has_next(&self) -> bool {
        (self.query.page as u64 + 1) < self.total_pages
    }

    /// 当前页显示的条目范围（从 1 开始，闭区间），空页返回 None
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.items.is_empty() {
            return None;
        }
        let start = (self.query.page * self.query.page_size) as u64 + 1;
        Some((start, start + self.items.len() as u64 - 1))
    }
}

pub type SnapshotOf<Src> =
    ListSnapshot<<Src as ListSource>::Item, <Src as ListSource>::Sort, <Src as ListSource>::Filter>;
pub type QueryOf<Src> = ListQuery<<Src as ListSource>::Sort, <Src as ListSource>::Filter>;

/// 一次刷新的结果
#[derive(Debug)]
pub enum RefreshOutcome {
    /// 响应已应用
    Applied,
    /// 有更新的查询已发出，本次响应被丢弃
    Superseded,
    /// 查询失败，旧数据保留
    Failed(AdminError),
    /// 参数未变化，未发起查询
    Unchanged,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied)
    }
}

// =========================================================
// 控制器
// =========================================================

struct ControllerState<Src: ListSource> {
    snapshot: SnapshotOf<Src>,
    generation: u64,
}

type Listener<Src> = Box<dyn Fn(&SnapshotOf<Src>)>;

pub struct ListController<Src: ListSource> {
    source: Rc<Src>,
    state: Rc<RefCell<ControllerState<Src>>>,
    listeners: Rc<RefCell<Vec<Listener<Src>>>>,
}

impl<Src: ListSource> Clone for ListController<Src> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            state: self.state.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<Src: ListSource> ListController<Src> {
    pub fn new(source: Rc<Src>, page_size: usize) -> Self {
        let snapshot = ListSnapshot {
            query: ListQuery::new(page_size),
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
            loading: false,
            last_error: None,
        };
        Self {
            source,
            state: Rc::new(RefCell::new(ControllerState {
                snapshot,
                generation: 0,
            })),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn snapshot(&self) -> SnapshotOf<Src> {
        self.state.borrow().snapshot.clone()
    }

    pub fn query(&self) -> QueryOf<Src> {
        self.state.borrow().snapshot.query.clone()
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&SnapshotOf<Src>) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for listener in self.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }

    fn current_generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// 记录新查询并分配代号
    fn begin(&self, query: QueryOf<Src>) -> u64 {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.snapshot.query = query;
            state.snapshot.loading = true;
            state.generation
        };
        self.notify();
        generation
    }

    // --- 输入 ---

    pub async fn set_page(&self, page: usize) -> RefreshOutcome {
        self.change(|q| q.page = page).await
    }

    pub async fn set_page_size(&self, page_size: usize) -> RefreshOutcome {
        if page_size == 0 {
            return RefreshOutcome::Failed(
                AdminError::invalid_input("page size must be positive").in_op("query.page_size"),
            );
        }
        self.change(|q| {
            if q.page_size != page_size {
                q.page_size = page_size;
                q.page = 0;
            }
        })
        .await
    }

    /// 排序变化回到第一页
    pub async fn set_sort(&self, sort_by: Src::Sort, direction: SortDirection) -> RefreshOutcome {
        self.change(|q| {
            if q.sort_by != sort_by || q.sort_direction != direction {
                q.sort_by = sort_by;
                q.sort_direction = direction;
                q.page = 0;
            }
        })
        .await
    }

    /// 点击同一列切换方向，点击新列从升序开始
    pub async fn toggle_sort(&self, sort_by: Src::Sort) -> RefreshOutcome {
        let current = self.query();
        let direction = if current.sort_by == sort_by {
            current.sort_direction.toggled()
        } else {
            SortDirection::Asc
        };
        self.set_sort(sort_by, direction).await
    }

    /// 筛选变化回到第一页
    pub async fn set_filter(&self, filter: Src::Filter) -> RefreshOutcome {
        self.change(|q| {
            if q.filter != filter {
                q.filter = filter;
                q.page = 0;
            }
        })
        .await
    }

    pub async fn update_filter<F>(&self, edit: F) -> RefreshOutcome
    where
        F: FnOnce(&mut Src::Filter),
    {
        let mut filter = self.query().filter;
        edit(&mut filter);
        self.set_filter(filter).await
    }

    async fn change<F>(&self, edit: F) -> RefreshOutcome
    where
        F: FnOnce(&mut QueryOf<Src>),
    {
        let current = self.query();
        let mut next = current.clone();
        edit(&mut next);
        if next == current {
            return RefreshOutcome::Unchanged;
        }
        self.run(next).await
    }

    // --- 查询 ---

    /// 按当前参数重新查询
    pub async fn refresh(&self) -> RefreshOutcome {
        let query = self.query();
        self.run(query).await
    }

    async fn run(&self, mut query: QueryOf<Src>) -> RefreshOutcome {
        let mut generation = self.begin(query.clone());
        let mut clamped = false;

        loop {
            let result = self.source.fetch(&query).await;

            if self.current_generation() != generation {
                tracing::debug!(generation, "list response superseded");
                return RefreshOutcome::Superseded;
            }

            match result {
                Ok(page) => {
                    if !clamped && query.page > 0 && page.items.is_empty() {
                        let last = last_page_index(page.total_items, query.page_size);
                        if last < query.page {
                            tracing::debug!(from = query.page, to = last, "empty trailing page, clamping");
                            query.page = last;
                            clamped = true;
                            generation = self.begin(query.clone());
                            continue;
                        }
                    }
                    self.apply(page);
                    return RefreshOutcome::Applied;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "list fetch failed, keeping previous rows");
                    {
                        let mut state = self.state.borrow_mut();
                        state.snapshot.loading = false;
                        state.snapshot.last_error = Some(e.to_string());
                    }
                    self.notify();
                    return RefreshOutcome::Failed(e.in_op("query.refresh"));
                }
            }
        }
    }

    fn apply(&self, page: PaginatedResult<Src::Item>) {
        {
            let mut state = self.state.borrow_mut();
            let snapshot = &mut state.snapshot;
            snapshot.items = page.items;
            snapshot.total_items = page.total_items;
            snapshot.total_pages = page.total_pages;
            snapshot.loading = false;
            snapshot.last_error = None;
        }
        self.notify();
    }

    // --- 变更后的刷新 ---

    /// 保存成功后按当前参数刷新；保存失败原样返回错误，不刷新
    pub async fn save_and_refresh<Fut>(&self, save: Fut) -> AdminResult<RefreshOutcome>
    where
        Fut: Future<Output = AdminResult<()>>,
    {
        save.await?;
        Ok(self.refresh().await)
    }
}

impl<Src> ListController<Src>
where
    Src: ListSource,
    Src::Item: Identified,
{
    /// 删除成功后先在本地移除该行，再刷新校正
    pub async fn delete_and_refresh<Fut>(&self, id: i64, delete: Fut) -> AdminResult<RefreshOutcome>
    where
        Fut: Future<Output = AdminResult<()>>,
    {
        delete.await?;
        self.remove_local(id);
        Ok(self.refresh().await)
    }

    fn remove_local(&self, id: i64) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let snapshot = &mut state.snapshot;
            let before = snapshot.items.len();
            snapshot.items.retain(|item| item.id() != id);
            let removed = snapshot.items.len() != before;
            if removed {
                snapshot.total_items = snapshot.total_items.saturating_sub(1);
            }
            removed
        };
        if removed {
            self.notify();
        }
    }
}
