//! 分页工具
//!
//! - [`SimplePage`]：不统计总数，多取一行判断是否还有下一页
//! - [`CountedPage`]：附带总数，用于后台表格

use serde::Serialize;

/// 计算页码对应的偏移量，页码从 1 开始，小于 1 按 1 处理
pub fn offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(per_page)
}

/// 简单分页结果
#[derive(Debug)]
pub struct SimplePage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
}

/// [`SimplePage`] 的页码信息
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SimplePaginator {
    pub page: u32,
    pub per_page: u32,
    pub has_more_pages: bool,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl<T> SimplePage<T> {
    /// 由多取一行的查询结果构建分页
    ///
    /// `rows` 应按 `per_page + 1` 条查询，超出的那一行只用于判断是否存在下一页。
    pub fn from_overfetched(mut rows: Vec<T>, page: u32, per_page: u32) -> Self {
        let per_page_len = per_page as usize;
        let has_more = rows.len() > per_page_len;
        rows.truncate(per_page_len);

        Self {
            items: rows,
            page: page.max(1),
            per_page,
            has_more,
        }
    }

    /// 查询时应使用的 `LIMIT`
    pub fn fetch_limit(per_page: u32) -> i64 {
        i64::from(per_page) + 1
    }

    pub fn paginator(&self) -> SimplePaginator {
        SimplePaginator {
            page: self.page,
            per_page: self.per_page,
            has_more_pages: self.has_more,
            previous_page: (self.page > 1).then(|| self.page - 1),
            next_page: self.has_more.then(|| self.page + 1),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SimplePage<U> {
        SimplePage {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            has_more: self.has_more,
        }
    }
}

/// 带总数的分页结果
#[derive(Debug)]
pub struct CountedPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// [`CountedPage`] 的页码信息
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CountedPaginator {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub last_page: u32,
}

impl<T> CountedPage<T> {
    pub fn last_page(&self) -> u32 {
        if self.per_page == 0 || self.total <= 0 {
            return 1;
        }
        let per_page = i64::from(self.per_page);
        u32::try_from((self.total + per_page - 1) / per_page).unwrap_or(u32::MAX)
    }

    pub fn paginator(&self) -> CountedPaginator {
        CountedPaginator {
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(offset(0, 3), 0);
        assert_eq!(offset(1, 3), 0);
        assert_eq!(offset(2, 3), 3);
        assert_eq!(offset(5, 10), 40);
    }

    #[test]
    fn test_simple_page_has_more() {
        let page = SimplePage::from_overfetched(vec![1, 2, 3, 4], 1, 3);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(
            page.paginator(),
            SimplePaginator {
                page: 1,
                per_page: 3,
                has_more_pages: true,
                previous_page: None,
                next_page: Some(2),
            }
        );
    }

    #[test]
    fn test_simple_page_last() {
        let page = SimplePage::from_overfetched(vec![7, 8], 3, 3);
        assert_eq!(page.items, vec![7, 8]);

        let paginator = page.paginator();
        assert!(!paginator.has_more_pages);
        assert_eq!(paginator.previous_page, Some(2));
        assert_eq!(paginator.next_page, None);
    }

    #[test]
    fn test_simple_page_map() {
        let page = SimplePage::from_overfetched(vec![1, 2], 1, 3).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert!(!page.has_more);
    }

    #[test]
    fn test_counted_last_page() {
        let page = CountedPage::<()> {
            items: vec![],
            page: 1,
            per_page: 10,
            total: 0,
        };
        assert_eq!(page.last_page(), 1);

        let page = CountedPage::<()> {
            items: vec![],
            page: 1,
            per_page: 10,
            total: 21,
        };
        assert_eq!(page.last_page(), 3);
    }
}
