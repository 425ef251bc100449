//! 列表控制器的响应式包装
//!
//! 控制器本身（含 `Rc`）放在本地 `StoredValue` 中，快照通过订阅镜像到信号。
//! 所有输入变化都交给控制器处理：一次变化一次查询，过期响应由控制器丢弃。

use leptos::prelude::*;
use leptos::task::spawn_local;
use shopadmin::query::{ListController, ListSource, RefreshOutcome, SnapshotOf, SortDirection};
use std::future::Future;
use std::rc::Rc;

pub struct ListHandle<Src: ListSource + 'static> {
    controller: StoredValue<ListController<Src>, LocalStorage>,
    pub snapshot: RwSignal<SnapshotOf<Src>>,
}

impl<Src: ListSource + 'static> Clone for ListHandle<Src> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Src: ListSource + 'static> Copy for ListHandle<Src> {}

impl<Src> ListHandle<Src>
where
    Src: ListSource + 'static,
    SnapshotOf<Src>: Send + Sync,
{
    /// 创建控制器并立即加载第一页
    pub fn new(source: Src, page_size: usize) -> Self {
        Self::shared(Rc::new(source), page_size)
    }

    /// 数据源还需要在页面其他地方使用时（如分类页的完整列表）
    pub fn shared(source: Rc<Src>, page_size: usize) -> Self {
        let controller = ListController::new(source, page_size);
        let snapshot = RwSignal::new(controller.snapshot());
        controller.subscribe(move |next| {
            snapshot.try_set(next.clone());
        });

        let handle = Self {
            controller: StoredValue::new_local(controller),
            snapshot,
        };
        handle.refresh();
        handle
    }

    /// 控制器句柄；组件已卸载时为 `None`
    pub fn controller(&self) -> Option<ListController<Src>> {
        self.controller.try_get_value()
    }

    fn spawn<F, Fut>(&self, op: &'static str, run: F)
    where
        F: FnOnce(ListController<Src>) -> Fut + 'static,
        Fut: Future<Output = RefreshOutcome> + 'static,
    {
        let Some(controller) = self.controller() else {
            return;
        };
        spawn_local(async move {
            if let RefreshOutcome::Failed(e) = run(controller).await {
                tracing::warn!(op, error = %e, "list update failed");
            }
        });
    }

    pub fn refresh(&self) {
        self.spawn("refresh", |c| async move { c.refresh().await });
    }

    pub fn set_page(&self, page: usize) {
        self.spawn("page", move |c| async move { c.set_page(page).await });
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.spawn("page_size", move |c| async move {
            c.set_page_size(page_size).await
        });
    }

    pub fn toggle_sort(&self, sort_by: Src::Sort) {
        self.spawn("sort", move |c| async move { c.toggle_sort(sort_by).await });
    }

    pub fn update_filter<F>(&self, edit: F)
    where
        F: FnOnce(&mut Src::Filter) + 'static,
    {
        self.spawn("filter", move |c| async move { c.update_filter(edit).await });
    }

    /// 当前排序方向的列头箭头
    pub fn sort_indicator(&self, column: Src::Sort) -> &'static str {
        let (sort_by, direction) = self
            .snapshot
            .with(|s| (s.query.sort_by, s.query.sort_direction));
        if sort_by != column {
            return "";
        }
        match direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        }
    }
}
