use crate::db::ExpenseStore;
use crate::error::{AppError, StoreError};
use crate::form::ExpenseForm;
use crate::model::{Amount, Expense};
use std::collections::BTreeSet;

/// 当前弹窗；同一时间最多一个
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Error { title: String, message: String },
    Warning { title: String, message: String },
    Info { title: String, message: String },
    /// 等待用户确认删除这些 id
    ConfirmDelete { ids: Vec<i64> },
}

impl Dialog {
    fn error(err: &AppError) -> Self {
        Dialog::Error {
            title: err.title().to_string(),
            message: err.to_string(),
        }
    }

    fn info(title: &str, message: impl Into<String>) -> Self {
        Dialog::Info {
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// 应用上下文：持有存储和全部界面状态
pub struct App<S: ExpenseStore> {
    store: Option<S>,
    pub records: Vec<Expense>,
    pub form: ExpenseForm,
    pub selected: BTreeSet<i64>,
    pub dialog: Option<Dialog>,
}

impl<S: ExpenseStore> App<S> {
    pub fn new(store: S) -> Self {
        let mut app = Self::empty(Some(store));
        app.load_data();
        app
    }

    /// 数据库打不开时以降级模式启动，所有存储操作都会失败
    pub fn degraded(err: StoreError) -> Self {
        log::error!("starting without database: {}", err);
        let mut app = Self::empty(None);
        app.show_error(&AppError::Store(err));
        app
    }

    fn empty(store: Option<S>) -> Self {
        Self {
            store,
            records: Vec::new(),
            form: ExpenseForm::new(),
            selected: BTreeSet::new(),
            dialog: None,
        }
    }

    fn store(&self) -> Result<&S, StoreError> {
        self.store.as_ref().ok_or(StoreError::Unavailable)
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_none()
    }

    fn show_error(&mut self, err: &AppError) {
        self.dialog = Some(Dialog::error(err));
    }

    /// 列表中记录的合计
    pub fn listed_total(&self) -> Amount {
        self.records.iter().map(|r| r.amount).sum()
    }

    fn refresh(&mut self) -> Result<(), StoreError> {
        self.records = self.store()?.list_all()?;
        let records = &self.records;
        self.selected.retain(|id| records.iter().any(|r| r.id == *id));
        Ok(())
    }

    /// 重新读取列表，失败时弹窗
    pub fn load_data(&mut self) {
        if let Err(e) = self.refresh() {
            log::error!("failed to load expenses: {}", e);
            self.show_error(&e.into());
        }
    }

    pub fn add_expense(&mut self) {
        let expense = match self.form.validate() {
            Ok(expense) => expense,
            Err(e) => {
                log::info!("rejected expense input: {}", e);
                self.show_error(&e.into());
                return;
            }
        };

        let result = self.store().and_then(|store| store.insert(&expense));
        if let Err(e) = result {
            log::error!("failed to add expense: {}", e);
            self.show_error(&e.into());
            return;
        }

        log::info!("added {} expense of {}", expense.category, expense.amount);
        self.form.clear_after_add();
        if let Err(e) = self.refresh() {
            self.show_error(&e.into());
            return;
        }
        self.dialog = Some(Dialog::info("Success", "Expense added successfully!"));
    }

    pub fn toggle_selected(&mut self, id: i64, selected: bool) {
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    /// 删除前先确认
    pub fn request_delete(&mut self) {
        if self.selected.is_empty() {
            self.dialog = Some(Dialog::Warning {
                title: "Selection Error".to_string(),
                message: "Please select an item to delete".to_string(),
            });
            return;
        }
        self.dialog = Some(Dialog::ConfirmDelete {
            ids: self.selected.iter().copied().collect(),
        });
    }

    /// 处理确认框的回答
    pub fn answer_delete(&mut self, confirmed: bool) {
        let ids = match self.dialog.take() {
            Some(Dialog::ConfirmDelete { ids }) => ids,
            other => {
                self.dialog = other;
                return;
            }
        };
        if !confirmed {
            return;
        }

        let result = self.store().and_then(|store| {
            let mut removed = 0;
            for id in &ids {
                if store.delete_by_id(*id)? {
                    removed += 1;
                }
            }
            Ok(removed)
        });
        self.selected.clear();
        match result {
            Ok(removed) => {
                log::info!("deleted {} of {} selected expense(s)", removed, ids.len());
                self.load_data();
            }
            Err(e) => {
                log::error!("failed to delete expenses: {}", e);
                // 部分删除后也要刷新
                if let Err(reload) = self.refresh() {
                    log::error!("failed to reload expenses after delete: {}", reload);
                }
                self.show_error(&e.into());
            }
        }
    }

    pub fn view_summary(&mut self) {
        match self.store().and_then(|store| store.summarize_by_category()) {
            Ok(summary) => {
                self.dialog = Some(Dialog::info("Spending Summary", summary.report()));
            }
            Err(e) => {
                log::error!("failed to summarize expenses: {}", e);
                self.show_error(&e.into());
            }
        }
    }

    /// 关闭信息类弹窗（确认框走 `answer_delete`）
    pub fn dismiss_dialog(&mut self) {
        if !matches!(self.dialog, Some(Dialog::ConfirmDelete { .. })) {
            self.dialog = None;
        }
    }
}
