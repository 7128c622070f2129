use crate::config::Config;
use crate::error::StoreError;
use crate::model::{Amount, Expense, NewExpense};
use crate::summary::Summary;
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// 表现层依赖的存储接口，测试中可以替换为内存实现
pub trait ExpenseStore {
    /// 建表（幂等）
    fn ensure_schema(&self) -> Result<(), StoreError>;

    /// 全部记录，按日期字符串降序
    fn list_all(&self) -> Result<Vec<Expense>, StoreError>;

    fn insert(&self, expense: &NewExpense) -> Result<(), StoreError>;

    /// 返回是否真的删掉了一行；id 不存在不算错误
    fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;

    fn summarize_by_category(&self) -> Result<Summary, StoreError>;
}

pub struct Database {
    // 只在 Drop 时取走，用于显式关闭连接
    conn: Option<Connection>,
}

impl Database {
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        let path = &config.database_path;
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("could not create {}: {}", parent.display(), e);
            }
        }
        let conn = Connection::open(path).map_err(|source| StoreError::Connection {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("opened database {}", path.display());
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Connection {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let db = Database { conn: Some(conn) };
        db.ensure_schema()?;
        Ok(db)
    }

    fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Unavailable)
    }
}

impl ExpenseStore for Database {
    fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn()?
            .execute(
                "CREATE TABLE IF NOT EXISTS expenses (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    category TEXT NOT NULL,
                    amount_cents INTEGER NOT NULL,
                    description TEXT NOT NULL DEFAULT ''
                )",
                [],
            )
            .map_err(StoreError::Schema)?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Expense>, StoreError> {
        // 按字符串排序，YYYY-MM-DD 格式下与日历顺序一致
        let mut stmt = self.conn()?.prepare(
            "SELECT id, date, category, amount_cents, description FROM expenses ORDER BY date DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Expense {
                id: row.get(0)?,
                date: row.get(1)?,
                category: row.get(2)?,
                amount: row.get(3)?,
                description: row.get(4)?,
            })
        })?;
        let expenses = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        log::debug!("loaded {} expenses", expenses.len());
        Ok(expenses)
    }

    fn insert(&self, expense: &NewExpense) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO expenses (date, category, amount_cents, description) VALUES (?1, ?2, ?3, ?4)",
            params![expense.date, expense.category, expense.amount, expense.description],
        )?;
        log::debug!("inserted expense {} {} {}", expense.date, expense.category, expense.amount);
        Ok(())
    }

    fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let n = self.conn()?.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
        log::debug!("delete id={} removed {} row(s)", id, n);
        Ok(n > 0)
    }

    fn summarize_by_category(&self) -> Result<Summary, StoreError> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT category, SUM(amount_cents) FROM expenses GROUP BY category")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, Amount>(1)?)))?;
        let summary = rows.collect::<rusqlite::Result<Summary>>()?;
        Ok(summary)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => log::info!("database closed"),
                Err((_, e)) => log::warn!("failed to close database cleanly: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn new_expense(date: &str, category: &str, amount: &str, description: &str) -> NewExpense {
        NewExpense {
            date: date.to_string(),
            category: category.to_string(),
            amount: amount.parse().unwrap(),
            description: description.to_string(),
        }
    }

    #[test]
    fn insert_adds_exactly_one_retrievable_record() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_all().unwrap().is_empty());

        db.insert(&new_expense("2024-05-01", "Food", "12.50", "Lunch")).unwrap();
        let all = db.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].date, "2024-05-01");
        assert_eq!(all[0].category, "Food");
        assert_eq!(all[0].amount, Amount::from_cents(1250));
        assert_eq!(all[0].description, "Lunch");

        db.insert(&new_expense("2024-05-01", "Whatever", "1", "")).unwrap();
        assert_eq!(db.list_all().unwrap().len(), 2);
    }

    #[test]
    fn ids_are_unique() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..3 {
            db.insert(&new_expense("2024-01-01", "Other", "1", "")).unwrap();
        }
        let ids: BTreeSet<i64> = db.list_all().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn delete_removes_only_that_record() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&new_expense("2024-05-01", "Food", "1", "a")).unwrap();
        db.insert(&new_expense("2024-05-02", "Food", "2", "b")).unwrap();
        db.insert(&new_expense("2024-05-03", "Food", "3", "c")).unwrap();

        let target = db.list_all().unwrap().into_iter().find(|e| e.description == "b").unwrap();
        assert!(db.delete_by_id(target.id).unwrap());

        let left: Vec<String> = db.list_all().unwrap().into_iter().map(|e| e.description).collect();
        assert_eq!(left, vec!["c", "a"]);
    }

    #[test]
    fn deleting_unknown_id_is_noop() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&new_expense("2024-05-01", "Food", "1", "")).unwrap();
        assert!(!db.delete_by_id(9999).unwrap());
        assert_eq!(db.list_all().unwrap().len(), 1);
    }

    #[test]
    fn list_orders_by_date_text_descending() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&new_expense("2024-02-01", "Food", "1", "feb")).unwrap();
        db.insert(&new_expense("2024-12-01", "Food", "1", "dec")).unwrap();
        db.insert(&new_expense("2023-12-31", "Food", "1", "old")).unwrap();
        // 非零填充的日期按字符串比较
        db.insert(&new_expense("2024-9-01", "Food", "1", "unpadded")).unwrap();

        let order: Vec<String> = db.list_all().unwrap().into_iter().map(|e| e.description).collect();
        assert_eq!(order, vec!["unpadded", "dec", "feb", "old"]);
    }

    #[test]
    fn same_date_lists_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&new_expense("2024-05-01", "Food", "1", "first")).unwrap();
        db.insert(&new_expense("2024-05-01", "Food", "1", "second")).unwrap();
        let order: Vec<String> = db.list_all().unwrap().into_iter().map(|e| e.description).collect();
        assert_eq!(order, vec!["second", "first"]);
    }

    #[test]
    fn summary_sums_per_category_and_omits_empty() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&new_expense("2024-05-01", "Food", "12.50", "")).unwrap();
        db.insert(&new_expense("2024-05-02", "Food", "0.10", "")).unwrap();
        db.insert(&new_expense("2024-05-02", "Transport", "7.25", "")).unwrap();

        let summary = db.summarize_by_category().unwrap();
        assert_eq!(summary.get("Food"), Some(Amount::from_cents(1260)));
        assert_eq!(summary.get("Transport"), Some(Amount::from_cents(725)));
        assert_eq!(summary.get("Rent"), None);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.total(), Amount::from_cents(1985));
    }

    #[test]
    fn summary_of_empty_table_is_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.summarize_by_category().unwrap().is_empty());
    }

    #[test]
    fn end_to_end_food_and_transport() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&new_expense("2024-05-01", "Food", "12.50", "Lunch")).unwrap();
        db.insert(&new_expense("2024-05-02", "Transport", "7.25", "Bus")).unwrap();

        let all = db.list_all().unwrap();
        assert_eq!(all[0].category, "Transport");
        assert_eq!(all[1].category, "Food");

        let summary = db.summarize_by_category().unwrap();
        let pairs: Vec<(String, String)> = summary
            .categories()
            .map(|(c, a)| (c.to_string(), a.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Food".to_string(), "12.50".to_string()),
                ("Transport".to_string(), "7.25".to_string())
            ]
        );
    }

    #[test]
    fn schema_is_idempotent_and_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("nested").join("expenses.db"),
        };

        {
            let db = Database::open(&config).unwrap();
            db.ensure_schema().unwrap();
            db.insert(&new_expense("2024-05-01", "Rent", "800", "May")).unwrap();
        }
        assert!(config.database_path.exists());

        let db = Database::open(&config).unwrap();
        let all = db.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, Amount::from_cents(80000));
    }

    #[test]
    fn unopenable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // 父路径是普通文件，数据库无法创建
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let config = Config {
            database_path: blocker.join("expenses.db"),
        };
        match Database::open(&config) {
            Err(StoreError::Connection { path, .. }) => assert_eq!(path, config.database_path),
            Err(StoreError::Schema(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening below a regular file should fail"),
        }
    }
}
