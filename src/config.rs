use std::{env, path::PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// 服务配置
///
/// 先读取 `BLOGDESK_CONFIG` 指向的 TOML 文件（可选），再由环境变量覆盖：
///
/// - `DATABASE_URL`：数据库连接串
/// - `BLOGDESK_LISTEN`：监听地址，默认 `0.0.0.0:3000`
/// - `BLOGDESK_STORAGE`：上传文件根目录，默认 `storage`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: String,
    pub database_url: Option<String>,
    pub storage_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            database_url: None,
            storage_root: PathBuf::from("storage"),
        }
    }
}

impl Config {
    /// 从配置文件和进程环境变量加载配置
    pub fn load() -> Result<Self> {
        let config = match env::var("BLOGDESK_CONFIG") {
            Ok(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            Err(_) => Self::default(),
        };

        Ok(config.with_env(|key| env::var(key).ok()))
    }

    /// 解析 TOML 配置内容，缺失的字段使用默认值
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Into::into)
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 返回 `None` 的变量保持原值不变。
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(listen) = lookup("BLOGDESK_LISTEN") {
            self.listen = listen;
        }
        if let Some(root) = lookup("BLOGDESK_STORAGE") {
            self.storage_root = PathBuf::from(root);
        }
        self
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or(Error::MissingConfig("DATABASE_URL"))
    }
}
