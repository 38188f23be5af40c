use serde::{Deserialize, Serialize};

/// 软删除筛选
///
/// - [`TrashedFilter::Without`]：只看未删除的记录（默认）
/// - [`TrashedFilter::With`]：包含已删除的记录
/// - [`TrashedFilter::Only`]：只看已删除的记录
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashedFilter {
    #[default]
    #[serde(alias = "")]
    Without,
    With,
    Only,
}

impl TrashedFilter {
    /// 对应的 SQL 条件，`column` 为软删除标记列
    pub fn condition(&self, column: &str) -> Option<String> {
        match self {
            TrashedFilter::Without => Some(format!("{column} IS NULL")),
            TrashedFilter::With => None,
            TrashedFilter::Only => Some(format!("{column} IS NOT NULL")),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrashedFilter::Without => "Without trashed records",
            TrashedFilter::With => "With trashed records",
            TrashedFilter::Only => "Only trashed records",
        }
    }
}
