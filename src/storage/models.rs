use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use crate::content::PostForm;

/// 作者
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// 分类
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// 文章所属分类的简要信息，由查询中的 `jsonb_agg` 生成
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryRef {
    pub title: String,
    pub slug: String,
}

/// 公开列表中的文章
///
/// 只会包含已发布的文章，因此 `published_at` 不为空。
#[derive(Debug, sqlx::FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub image: Option<String>,
    pub published_at: DateTime<Local>,
    pub featured: bool,
    pub author_name: String,
    pub categories: Json<Vec<CategoryRef>>,
}

/// 后台表格中的一行，不受软删除范围限制
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub image: Option<String>,
    pub published_at: Option<DateTime<Local>>,
    pub featured: bool,
    pub author_id: i64,
    pub author_name: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub deleted_at: Option<DateTime<Local>>,
}

impl PostRow {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// 编辑页使用的完整记录，附带关联分类的 id
#[derive(Debug, sqlx::FromRow)]
pub struct PostRecord {
    #[sqlx(flatten)]
    pub row: PostRow,
    pub category_ids: Vec<i64>,
}

impl From<PostRecord> for PostForm {
    fn from(record: PostRecord) -> Self {
        let PostRecord { row, category_ids } = record;

        PostForm {
            title: row.title,
            slug: row.slug,
            body: row.body,
            image: row.image,
            published_at: row.published_at,
            featured: row.featured,
            author: Some(row.author_id),
            categories: category_ids,
        }
    }
}
