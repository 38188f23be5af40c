use std::future::Future;

use sqlx::PgExecutor;

use super::DBPool;
use crate::content::PostForm;

/// 提供文章的写操作
///
/// 新增、修改、软删除、恢复与彻底删除。涉及多张表的写入（文章与分类关联）应在事务中调用。
pub trait PostStorage {
    /// 获取 SQL 执行器，用于 [`sqlx::query()`] 执行
    fn executor<'t>(&'t mut self) -> impl PgExecutor<'t>;

    /// 插入文章，返回新记录的 id
    fn insert_post(&mut self, form: &PostForm) -> impl Future<Output = Result<i64, sqlx::Error>> {
        async move {
            sqlx::query_scalar(
                r#"
                INSERT INTO posts
                    (title, slug, body, image, published_at, featured, author_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(&form.title)
            .bind(&form.slug)
            .bind(&form.body)
            .bind(&form.image)
            .bind(form.published_at)
            .bind(form.featured)
            .bind(form.author)
            .fetch_one(self.executor())
            .await
        }
    }

    /// 更新文章，返回是否存在该记录
    fn update_post(
        &mut self,
        id: i64,
        form: &PostForm,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> {
        async move {
            let result = sqlx::query(
                r#"
                UPDATE posts
                SET title = $2,
                    slug = $3,
                    body = $4,
                    image = $5,
                    published_at = $6,
                    featured = $7,
                    author_id = $8,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(&form.title)
            .bind(&form.slug)
            .bind(&form.body)
            .bind(&form.image)
            .bind(form.published_at)
            .bind(form.featured)
            .bind(form.author)
            .execute(self.executor())
            .await?;
            Ok(result.rows_affected() > 0)
        }
    }

    /// 用 `category_ids` 替换文章的分类关联
    fn sync_categories(
        &mut self,
        post_id: i64,
        category_ids: &[i64],
    ) -> impl Future<Output = Result<(), sqlx::Error>> {
        async move {
            sqlx::query("DELETE FROM category_post WHERE post_id = $1")
                .bind(post_id)
                .execute(self.executor())
                .await?;

            sqlx::query(
                r#"
                INSERT INTO category_post (post_id, category_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(category_ids)
            .execute(self.executor())
            .await?;
            Ok(())
        }
    }

    /// 修改推荐标记，返回是否存在该记录
    fn set_featured(
        &mut self,
        id: i64,
        featured: bool,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> {
        async move {
            let result =
                sqlx::query("UPDATE posts SET featured = $2, updated_at = NOW() WHERE id = $1")
                    .bind(id)
                    .bind(featured)
                    .execute(self.executor())
                    .await?;
            Ok(result.rows_affected() > 0)
        }
    }

    /// 软删除，只影响尚未删除的记录
    fn soft_delete(&mut self, ids: &[i64]) -> impl Future<Output = Result<u64, sqlx::Error>> {
        async move {
            let result = sqlx::query(
                "UPDATE posts SET deleted_at = NOW() WHERE id = ANY($1) AND deleted_at IS NULL",
            )
            .bind(ids)
            .execute(self.executor())
            .await?;
            Ok(result.rows_affected())
        }
    }

    /// 恢复已软删除的记录
    fn restore(&mut self, ids: &[i64]) -> impl Future<Output = Result<u64, sqlx::Error>> {
        async move {
            let result = sqlx::query(
                "UPDATE posts SET deleted_at = NULL WHERE id = ANY($1) AND deleted_at IS NOT NULL",
            )
            .bind(ids)
            .execute(self.executor())
            .await?;
            Ok(result.rows_affected())
        }
    }

    /// 彻底删除，分类关联随外键级联删除
    fn force_delete(&mut self, ids: &[i64]) -> impl Future<Output = Result<u64, sqlx::Error>> {
        async move {
            let result = sqlx::query("DELETE FROM posts WHERE id = ANY($1)")
                .bind(ids)
                .execute(self.executor())
                .await?;
            Ok(result.rows_affected())
        }
    }
}

/// 为 [`sqlx::PgTransaction`] 实现 [`PostStorage`]
impl PostStorage for sqlx::PgTransaction<'_> {
    fn executor<'t>(&'t mut self) -> impl PgExecutor<'t> {
        self.as_mut()
    }
}

/// 为 [`DBPool`] 实现 [`PostStorage`]
impl PostStorage for &'_ DBPool {
    fn executor<'t>(&'t mut self) -> impl PgExecutor<'t> {
        *self
    }
}
