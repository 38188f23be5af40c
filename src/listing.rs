//! 公开文章列表
//!
//! [`PostList`] 保存列表的全部状态（排序、搜索词、分类、页码），这些状态与 URL 查询参数
//! 双向同步：请求时由查询参数还原，响应时再序列化回查询字符串。

use serde::{Deserialize, Serialize};

use crate::{
    content::SortDirection,
    error::Result,
    pagination::{self, SimplePage},
    storage::{ListingFilter, PostSummary, Querier},
};

/// 每页文章数
pub const PER_PAGE: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PostList {
    pub sort: SortDirection,
    pub search: String,
    /// 分类 slug
    pub category: String,
    pub page: u32,
}

impl Default for PostList {
    fn default() -> Self {
        Self {
            sort: SortDirection::Desc,
            search: String::new(),
            category: String::new(),
            page: 1,
        }
    }
}

impl PostList {
    /// 切换排序方向并回到第一页
    ///
    /// 只有 `desc` 是降序，其它取值一律视为升序。
    pub fn set_sort(&mut self, sort: &str) {
        self.sort = SortDirection::from_value(sort);
        self.reset_page();
    }

    /// 外部推送的新搜索词，不重置页码
    pub fn update_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// 构造查询条件
    ///
    /// `category_exists` 为 `false` 时不按分类过滤，即未知的分类 slug 等同于未指定。
    pub fn filter(&self, category_exists: bool) -> ListingFilter<'_> {
        ListingFilter {
            sort: self.sort,
            search: &self.search,
            category: category_exists.then_some(self.category.as_str()),
            limit: SimplePage::<()>::fetch_limit(PER_PAGE),
            offset: pagination::offset(self.page, PER_PAGE),
        }
    }

    /// 当前状态下的文章
    pub async fn posts<Q: Querier>(&self, querier: &Q) -> Result<SimplePage<PostSummary>> {
        let category_exists = if self.category.is_empty() {
            false
        } else {
            querier.category_by_slug(&self.category).await?.is_some()
        };

        let rows = querier.listing(&self.filter(category_exists)).await?;

        tracing::debug!(
            sort = self.sort.as_str(),
            search = %self.search,
            category = %self.category,
            category_exists,
            page = self.page,
            rows = rows.len(),
            "post list queried"
        );

        Ok(SimplePage::from_overfetched(rows, self.page, PER_PAGE))
    }

    /// 与当前状态对应的查询字符串，等于默认值的参数省略
    pub fn query_string(&self) -> String {
        let defaults = Self::default();
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());

        if self.sort != defaults.sort {
            serializer.append_pair("sort", self.sort.as_str());
        }
        if self.search != defaults.search {
            serializer.append_pair("search", &self.search);
        }
        if self.category != defaults.category {
            serializer.append_pair("category", &self.category);
        }
        if self.page > 1 {
            serializer.append_pair("page", &self.page.to_string());
        }

        serializer.finish()
    }
}
