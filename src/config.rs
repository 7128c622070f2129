//! 运行配置
//!
//! 数据库位置不写死在代码里，按以下顺序解析：
//!
//! 1. 环境变量 `EXPENSE_TRACKER_DB`
//! 2. 配置文件中的 `database_path`（路径取 `EXPENSE_TRACKER_CONFIG`，
//!    否则为系统配置目录下的 `expense-tracker/config.json`）
//! 3. 本地数据目录下的 `expense-tracker/expenses.db`

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DB_ENV: &str = "EXPENSE_TRACKER_DB";
pub const CONFIG_ENV: &str = "EXPENSE_TRACKER_CONFIG";

const APP_DIR: &str = "expense-tracker";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
}

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// 从环境变量和配置文件加载；配置文件出错时仍然使用环境变量，
    /// 同时把错误一并返回给调用方记录
    pub fn load() -> (Self, Option<anyhow::Error>) {
        let env_path = std::env::var_os(DB_ENV).map(PathBuf::from);
        Self::load_from(env_path, config_file_path().as_deref())
    }

    fn load_from(env_path: Option<PathBuf>, config_path: Option<&Path>) -> (Self, Option<anyhow::Error>) {
        let (file, error) = match config_path.map(load_config_file) {
            Some(Ok(file)) => (file, None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        };
        (Self::resolve(env_path, file), error)
    }

    /// 按优先级合并各来源
    pub fn resolve(env_path: Option<PathBuf>, file: Option<ConfigFile>) -> Self {
        let database_path = env_path
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| file.and_then(|f| f.database_path))
            .unwrap_or_else(default_db_path);
        Self { database_path }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push("expenses.db");
    path
}

fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let mut path = dirs::config_dir()?;
    path.push(APP_DIR);
    path.push("config.json");
    Some(path)
}

/// 读取配置文件；文件不存在返回 `None`，格式错误返回 `Err`
pub fn load_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Reading config file: {}", path.display()));
        }
    };
    let file: ConfigFile = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing config JSON in {}", path.display()))?;
    Ok(Some(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn env_overrides_config_file() {
        let file = ConfigFile {
            database_path: Some(PathBuf::from("/from/file.db")),
        };
        let config = Config::resolve(Some(PathBuf::from("/from/env.db")), Some(file));
        assert_eq!(config.database_path, PathBuf::from("/from/env.db"));
    }

    #[test]
    fn config_file_used_without_env() {
        let file = ConfigFile {
            database_path: Some(PathBuf::from("/from/file.db")),
        };
        let config = Config::resolve(None, Some(file));
        assert_eq!(config.database_path, PathBuf::from("/from/file.db"));
    }

    #[test]
    fn empty_env_falls_through_to_default() {
        let config = Config::resolve(Some(PathBuf::new()), Some(ConfigFile::default()));
        assert_eq!(config, Config::default());
        assert!(config.database_path.ends_with("expense-tracker/expenses.db"));
    }

    #[test]
    fn env_still_applies_when_config_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let (config, error) = Config::load_from(Some(PathBuf::from("/from/env.db")), Some(path.as_path()));
        assert_eq!(config.database_path, PathBuf::from("/from/env.db"));
        assert!(error.unwrap().to_string().contains("Parsing config JSON"));

        let (config, error) = Config::load_from(None, Some(path.as_path()));
        assert_eq!(config, Config::default());
        assert!(error.is_some());
    }

    #[test]
    fn missing_config_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_file(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn reads_database_path_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(f, r#"{{ "database_path": "/data/expenses.db" }}"#).unwrap();

        let loaded = load_config_file(&path).unwrap().unwrap();
        assert_eq!(loaded.database_path, Some(PathBuf::from("/data/expenses.db")));
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ database_path: ").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("Parsing config JSON"));
    }
}
