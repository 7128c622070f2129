use crate::error::ValidationError;
use crate::model::{NewExpense, CATEGORIES};
use chrono::Local;

/// 录入表单的文本内容
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    pub date: String,
    pub category: String,
    pub amount: String,
    pub description: String,
}

impl ExpenseForm {
    pub fn new() -> Self {
        Self {
            date: today(),
            category: CATEGORIES[0].to_string(),
            amount: String::new(),
            description: String::new(),
        }
    }

    /// 校验并转换为待写入的记录；日期只检查非空
    pub fn validate(&self) -> Result<NewExpense, ValidationError> {
        let date = self.date.trim();
        let amount = self.amount.trim();
        if date.is_empty() || amount.is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        let amount = amount.parse().map_err(|_| ValidationError::InvalidAmount)?;
        Ok(NewExpense {
            date: date.to_string(),
            category: self.category.trim().to_string(),
            amount,
            description: self.description.trim().to_string(),
        })
    }

    /// 添加成功后清空金额和备注，日期和类别保留
    pub fn clear_after_add(&mut self) {
        self.amount.clear();
        self.description.clear();
    }

    pub fn reset_date(&mut self) {
        self.date = today();
    }
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}
