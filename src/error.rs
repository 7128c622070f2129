use std::path::PathBuf;

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not open database at {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Could not create the expenses table: {0}")]
    Schema(#[source] rusqlite::Error),
    #[error("Database operation failed: {0}")]
    Operation(#[from] rusqlite::Error),
    #[error("Database is not available")]
    Unavailable,
}

/// 表单校验错误，发生在任何存储调用之前
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Date and Amount fields are required!")]
    MissingRequired,
    #[error("Amount must be a valid number!")]
    InvalidAmount,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// 弹窗标题
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Validation(ValidationError::MissingRequired) => "Input Error",
            AppError::Validation(ValidationError::InvalidAmount) => "Value Error",
            AppError::Store(_) => "Database Error",
        }
    }
}
