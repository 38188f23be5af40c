use std::future::Future;

use sqlx::{Postgres, QueryBuilder};

use super::{Author, Category, DBPool, PostRecord, PostRow, PostSummary};
use crate::content::{SortDirection, TrashedFilter};

/// 公开列表查询条件
#[derive(Debug)]
pub struct ListingFilter<'a> {
    pub sort: SortDirection,
    /// 标题子串，空字符串表示不过滤
    pub search: &'a str,
    /// 分类 slug，调用方需确认该分类存在
    pub category: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
}

/// 后台表格查询条件
#[derive(Debug)]
pub struct AdminListFilter<'a> {
    pub trashed: TrashedFilter,
    /// 按发布时间排序，`None` 时按 id 排序
    pub sort: Option<SortDirection>,
    /// 在发布时间的文本形式中搜索
    pub search: &'a str,
    pub limit: i64,
    pub offset: i64,
}

const POST_SUMMARY_SELECT: &str = r#"
    SELECT p.id, p.title, p.slug, p.body, p.image, p.published_at, p.featured,
           a.name AS author_name,
           COALESCE(
               (SELECT jsonb_agg(jsonb_build_object('title', c.title, 'slug', c.slug) ORDER BY c.title)
                FROM categories c
                INNER JOIN category_post cp ON cp.category_id = c.id
                WHERE cp.post_id = p.id),
               '[]'::jsonb
           ) AS categories
    FROM posts p
    INNER JOIN authors a ON a.id = p.author_id
"#;

const POST_ROW_SELECT: &str = r#"
    SELECT p.id, p.title, p.slug, p.body, p.image, p.published_at, p.featured,
           p.author_id, a.name AS author_name,
           p.created_at, p.updated_at, p.deleted_at
    FROM posts p
    INNER JOIN authors a ON a.id = p.author_id
"#;

/// 已发布：发布时间不为空且不晚于当前时间，且未被软删除
const PUBLISHED_CONDITION: &str =
    " WHERE p.deleted_at IS NULL AND p.published_at IS NOT NULL AND p.published_at <= NOW()";

/// 构造 `ILIKE` 子串匹配模式，转义 `\`、`%` 和 `_`
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// 构造公开列表的查询
pub fn listing_query<'a>(filter: &ListingFilter<'a>) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(POST_SUMMARY_SELECT);
    builder.push(PUBLISHED_CONDITION);

    if let Some(slug) = filter.category {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM category_post cp \
                 INNER JOIN categories c ON c.id = cp.category_id \
                 WHERE cp.post_id = p.id AND c.slug = ",
            )
            .push_bind(slug)
            .push(")");
    }

    if !filter.search.is_empty() {
        builder
            .push(" AND p.title ILIKE ")
            .push_bind(like_pattern(filter.search));
    }

    let dir = filter.sort.as_sql();
    builder.push(format!(" ORDER BY p.published_at {dir}, p.id {dir}"));
    builder.push(" LIMIT ").push_bind(filter.limit);
    builder.push(" OFFSET ").push_bind(filter.offset);
    builder
}

fn push_admin_conditions<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &AdminListFilter<'a>) {
    builder.push(" WHERE TRUE");

    if let Some(condition) = filter.trashed.condition("p.deleted_at") {
        builder.push(" AND ").push(condition);
    }

    if !filter.search.is_empty() {
        builder
            .push(" AND to_char(p.published_at, 'YYYY-MM-DD HH24:MI:SS') ILIKE ")
            .push_bind(like_pattern(filter.search));
    }
}

/// 构造后台表格的查询
///
/// 不带软删除范围，是否包含已删除记录由 [`TrashedFilter`] 决定。
pub fn admin_list_query<'a>(filter: &AdminListFilter<'a>) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(POST_ROW_SELECT);
    push_admin_conditions(&mut builder, filter);

    match filter.sort {
        Some(dir) => {
            let dir = dir.as_sql();
            builder.push(format!(" ORDER BY p.published_at {dir} NULLS LAST, p.id {dir}"))
        }
        None => builder.push(" ORDER BY p.id ASC"),
    };

    builder.push(" LIMIT ").push_bind(filter.limit);
    builder.push(" OFFSET ").push_bind(filter.offset);
    builder
}

fn admin_count_query<'a>(filter: &AdminListFilter<'a>) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
    push_admin_conditions(&mut builder, filter);
    builder
}

/// 用于查询文章、分类和作者
///
/// 公开查询只返回已发布且未删除的文章；后台查询不受软删除限制。
pub trait Querier: Send + Sync {
    /// 公开列表
    fn listing(
        &self,
        filter: &ListingFilter<'_>,
    ) -> impl Future<Output = Result<Vec<PostSummary>, sqlx::Error>> + Send;

    /// 最近发布的 `limit` 篇文章
    fn recent_posts(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<PostSummary>, sqlx::Error>> + Send;

    /// 根据 slug 查找分类
    fn category_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Category>, sqlx::Error>> + Send;

    /// 所有分类，按标题排序
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, sqlx::Error>> + Send;

    /// 按名称搜索作者
    fn authors(
        &self,
        search: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Author>, sqlx::Error>> + Send;

    /// 后台表格的一页数据以及符合条件的总数
    fn admin_list(
        &self,
        filter: &AdminListFilter<'_>,
    ) -> impl Future<Output = Result<(Vec<PostRow>, i64), sqlx::Error>> + Send;

    /// 根据 id 查找文章，包括已软删除的
    fn find_post(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<PostRecord>, sqlx::Error>> + Send;

    /// slug 是否已被其他文章占用（包括已软删除的），`ignore` 为当前编辑的记录
    fn slug_taken(
        &self,
        slug: &str,
        ignore: Option<i64>,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn author_exists(&self, id: i64) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// 返回 `ids` 中实际存在的分类 id
    fn existing_category_ids(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<Vec<i64>, sqlx::Error>> + Send;
}

impl Querier for DBPool {
    async fn listing(&self, filter: &ListingFilter<'_>) -> Result<Vec<PostSummary>, sqlx::Error> {
        let mut builder = listing_query(filter);
        builder.build_query_as::<PostSummary>().fetch_all(self).await
    }

    async fn recent_posts(&self, limit: i64) -> Result<Vec<PostSummary>, sqlx::Error> {
        self.listing(&ListingFilter {
            sort: SortDirection::Desc,
            search: "",
            category: None,
            limit,
            offset: 0,
        })
        .await
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, slug
            FROM categories
            WHERE slug = $1
            LIMIT 1
            "#,
        )
        .bind(slug)
        .fetch_optional(self)
        .await
    }

    async fn categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, title, slug FROM categories ORDER BY title")
            .fetch_all(self)
            .await
    }

    async fn authors(&self, search: &str, limit: i64) -> Result<Vec<Author>, sqlx::Error> {
        sqlx::query_as::<_, Author>(
            r#"
            SELECT id, name
            FROM authors
            WHERE name ILIKE $1
            ORDER BY name
            LIMIT $2
            "#,
        )
        .bind(like_pattern(search))
        .bind(limit)
        .fetch_all(self)
        .await
    }

    async fn admin_list(
        &self,
        filter: &AdminListFilter<'_>,
    ) -> Result<(Vec<PostRow>, i64), sqlx::Error> {
        let mut rows_query = admin_list_query(filter);
        let mut count_query = admin_count_query(filter);

        let rows = rows_query
            .build_query_as::<PostRow>()
            .fetch_all(self)
            .await?;
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(self)
            .await?;

        Ok((rows, total))
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostRecord>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT r.*,
                   ARRAY(
                       SELECT cp.category_id FROM category_post cp
                       WHERE cp.post_id = r.id
                       ORDER BY cp.category_id
                   ) AS category_ids
            FROM ("#,
        );
        builder
            .push(POST_ROW_SELECT)
            .push(" WHERE p.id = ")
            .push_bind(id)
            .push(") r");

        builder
            .build_query_as::<PostRecord>()
            .fetch_optional(self)
            .await
    }

    async fn slug_taken(&self, slug: &str, ignore: Option<i64>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM posts
                WHERE slug = $1
                AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(ignore)
        .fetch_one(self)
        .await
    }

    async fn author_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(self)
            .await
    }

    async fn existing_category_ids(&self, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(sort: SortDirection, search: &str, category: Option<&str>) -> String {
        listing_query(&ListingFilter {
            sort,
            search,
            category,
            limit: 4,
            offset: 0,
        })
        .sql()
        .to_string()
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("Hello"), "%Hello%");
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("100%_off"), r"%100\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn test_listing_only_published() {
        let sql = listing(SortDirection::Desc, "", None);
        assert!(sql.contains("p.deleted_at IS NULL"));
        assert!(sql.contains("p.published_at IS NOT NULL"));
        assert!(sql.contains("p.published_at <= NOW()"));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("c.slug ="));
    }

    #[test]
    fn test_listing_sort_direction() {
        assert!(listing(SortDirection::Desc, "", None).contains("ORDER BY p.published_at DESC"));
        assert!(listing(SortDirection::Asc, "", None).contains("ORDER BY p.published_at ASC"));
    }

    #[test]
    fn test_listing_filters() {
        let sql = listing(SortDirection::Desc, "Hello", Some("rust"));
        assert!(sql.contains("c.slug = $1"));
        assert!(sql.contains("p.title ILIKE $2"));
        assert!(sql.contains("LIMIT $3"));
        assert!(sql.contains("OFFSET $4"));
    }

    #[test]
    fn test_admin_list_trashed_filter() {
        let filter = |trashed| AdminListFilter {
            trashed,
            sort: None,
            search: "",
            limit: 10,
            offset: 0,
        };

        let sql = admin_list_query(&filter(TrashedFilter::Without)).sql().to_string();
        assert!(sql.contains("p.deleted_at IS NULL"));

        let sql = admin_list_query(&filter(TrashedFilter::Only)).sql().to_string();
        assert!(sql.contains("p.deleted_at IS NOT NULL"));

        let sql = admin_list_query(&filter(TrashedFilter::With)).sql().to_string();
        assert!(!sql.contains("p.deleted_at IS"));
        assert!(sql.contains("ORDER BY p.id ASC"));
    }

    #[test]
    fn test_admin_list_sort_and_search() {
        let filter = AdminListFilter {
            trashed: TrashedFilter::Without,
            sort: Some(SortDirection::Asc),
            search: "2024-06",
            limit: 10,
            offset: 10,
        };

        let sql = admin_list_query(&filter).sql().to_string();
        assert!(sql.contains("to_char(p.published_at"));
        assert!(sql.contains("ORDER BY p.published_at ASC NULLS LAST"));

        let count = admin_count_query(&filter).sql().to_string();
        assert!(count.starts_with("SELECT COUNT(*)"));
        assert!(!count.contains("LIMIT"));
    }
}
