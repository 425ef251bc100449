//! 变更对话框的状态机
//!
//! 草稿只属于打开中的对话框：关闭即丢弃，提交时整体发送。
//! 保存或删除失败时对话框保持打开并带上错误信息。

use crate::error::{AdminError, AdminResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
    /// 只读，只能关闭
    View,
}

/// 可编辑的草稿
pub trait Draft: Clone {
    /// 0 表示尚未保存
    fn id(&self) -> i64;
}

/// 提交类型，由草稿 id 是否为 0 决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Create,
    Update,
}

/// 取出的待提交草稿
#[derive(Debug, Clone)]
pub struct Submission<D> {
    pub kind: SubmitKind,
    pub draft: D,
}

#[derive(Debug, Clone)]
struct OpenDialog<D> {
    mode: DialogMode,
    draft: D,
    submitting: bool,
    error: Option<String>,
}

/// 新建/编辑/查看对话框
#[derive(Debug, Clone)]
pub struct EditDialog<D: Draft> {
    open: Option<OpenDialog<D>>,
}

impl<D: Draft> Default for EditDialog<D> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<D: Draft> EditDialog<D> {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_with(&mut self, mode: DialogMode, draft: D) {
        self.open = Some(OpenDialog {
            mode,
            draft,
            submitting: false,
            error: None,
        });
    }

    /// 以空白模板新建
    pub fn open_create(&mut self, template: D) {
        self.open_with(DialogMode::Create, template);
    }

    /// 以选中行的副本编辑
    pub fn open_edit(&mut self, row: &D) {
        self.open_with(DialogMode::Edit, row.clone());
    }

    pub fn open_view(&mut self, row: &D) {
        self.open_with(DialogMode::View, row.clone());
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn mode(&self) -> Option<DialogMode> {
        self.open.as_ref().map(|d| d.mode)
    }

    pub fn is_read_only(&self) -> bool {
        self.mode() == Some(DialogMode::View)
    }

    pub fn draft(&self) -> Option<&D> {
        self.open.as_ref().map(|d| &d.draft)
    }

    /// 可写草稿；只读模式和提交中返回 None
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self.open.as_mut() {
            Some(d) if d.mode != DialogMode::View && !d.submitting => Some(&mut d.draft),
            _ => None,
        }
    }

    /// 当前是否允许修改草稿（与 `draft_mut` 一致）
    pub fn is_editable(&self) -> bool {
        self.open
            .as_ref()
            .is_some_and(|d| d.mode != DialogMode::View && !d.submitting)
    }

    pub fn error(&self) -> Option<&str> {
        self.open.as_ref().and_then(|d| d.error.as_deref())
    }

    pub fn is_submitting(&self) -> bool {
        self.open.as_ref().is_some_and(|d| d.submitting)
    }

    /// 标记为提交中并取出整份草稿
    pub fn take_submission(&mut self) -> AdminResult<Submission<D>> {
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| AdminError::invalid_input("no dialog is open").in_op("dialog.submit"))?;
        if open.mode == DialogMode::View {
            return Err(AdminError::invalid_input("view-only dialog cannot be submitted")
                .in_op("dialog.submit"));
        }
        if open.submitting {
            return Err(AdminError::invalid_input("submission already in progress")
                .in_op("dialog.submit"));
        }
        open.submitting = true;
        open.error = None;
        let kind = if open.draft.id() == 0 {
            SubmitKind::Create
        } else {
            SubmitKind::Update
        };
        Ok(Submission {
            kind,
            draft: open.draft.clone(),
        })
    }

    /// 提交结果：成功关闭，失败保持打开并显示错误
    pub fn complete<T>(&mut self, result: &AdminResult<T>) {
        match result {
            Ok(_) => self.open = None,
            Err(e) => {
                if let Some(open) = self.open.as_mut() {
                    open.submitting = false;
                    open.error = Some(e.message().to_string());
                }
            }
        }
    }

    /// 提交前的客户端校验失败
    pub fn reject(&mut self, error: &AdminError) {
        if let Some(open) = self.open.as_mut() {
            open.submitting = false;
            open.error = Some(error.message().to_string());
        }
    }

    pub fn close(&mut self) {
        self.open = None;
    }
}

// =========================================================
// 删除确认
// =========================================================

/// 两步删除确认，只持有目标 id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pending: Option<i64>,
    in_flight: bool,
    error: Option<String>,
}

impl DeleteConfirmation {
    pub fn request(&mut self, id: i64) {
        self.pending = Some(id);
        self.in_flight = false;
        self.error = None;
    }

    pub fn pending(&self) -> Option<i64> {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// 已确认、删除请求尚未返回
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 取消：丢弃 id，不调用后端
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// 确认：返回要删除的 id（重复确认返回 None）
    pub fn confirm(&mut self) -> Option<i64> {
        if self.in_flight {
            return None;
        }
        let id = self.pending?;
        self.in_flight = true;
        self.error = None;
        Some(id)
    }

    pub fn complete<T>(&mut self, result: &AdminResult<T>) {
        match result {
            Ok(_) => *self = Self::default(),
            Err(e) => {
                self.in_flight = false;
                self.error = Some(e.message().to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: i64,
        text: String,
    }

    impl Draft for Note {
        fn id(&self) -> i64 {
            self.id
        }
    }

    #[test]
    fn test_edit_works_on_copy() {
        let row = Note {
            id: 4,
            text: "original".into(),
        };
        let mut dialog = EditDialog::new();
        dialog.open_edit(&row);
        dialog.draft_mut().unwrap().text = "changed".into();

        assert_eq!(row.text, "original");
        let submission = dialog.take_submission().unwrap();
        assert_eq!(submission.kind, SubmitKind::Update);
        assert_eq!(submission.draft.text, "changed");
    }

    #[test]
    fn test_rejected_save_keeps_dialog_open_with_error() {
        let mut dialog = EditDialog::new();
        dialog.open_create(Note {
            id: 0,
            text: String::new(),
        });
        let submission = dialog.take_submission().unwrap();
        assert_eq!(submission.kind, SubmitKind::Create);
        assert!(dialog.is_submitting());
        assert!(!dialog.is_editable());
        assert!(dialog.draft_mut().is_none());

        let result: AdminResult<()> = Err(AdminError::rejected(400, "Name is required"));
        dialog.complete(&result);
        assert!(dialog.is_open());
        assert_eq!(dialog.error(), Some("Name is required"));
        assert!(dialog.draft_mut().is_some());

        dialog.take_submission().unwrap();
        dialog.complete(&Ok(()));
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_view_only_cannot_edit_or_submit() {
        let row = Note {
            id: 1,
            text: "x".into(),
        };
        let mut dialog = EditDialog::new();
        dialog.open_view(&row);
        assert!(dialog.is_read_only());
        assert!(!dialog.is_editable());
        assert!(dialog.draft_mut().is_none());
        assert!(dialog.take_submission().is_err());
        dialog.close();
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_delete_confirmation_flow() {
        let mut confirm = DeleteConfirmation::default();
        confirm.request(9);
        confirm.cancel();
        assert_eq!(confirm.confirm(), None);

        confirm.request(9);
        assert_eq!(confirm.confirm(), Some(9));
        assert!(confirm.in_flight());
        assert_eq!(confirm.confirm(), None);

        let failed: AdminResult<()> = Err(AdminError::rejected(409, "order references product"));
        confirm.complete(&failed);
        assert!(confirm.is_open());
        assert!(!confirm.in_flight());
        assert_eq!(confirm.error(), Some("order references product"));

        assert_eq!(confirm.confirm(), Some(9));
        confirm.complete(&Ok(()));
        assert!(!confirm.is_open());
    }
}
