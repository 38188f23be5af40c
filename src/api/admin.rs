use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use super::{Error, Result};
use crate::{
    content::{FormOperation, PostForm, SortDirection, TrashedFilter},
    pagination::{self, CountedPage, CountedPaginator},
    resource::{BulkAction, FormSchema, PostResource, TableSchema},
    state::AppState,
    storage::{AdminListFilter, Author, Category, DBPool, PostStorage, Querier},
};

/// 表格允许的每页条数
const PER_PAGE_OPTIONS: [u32; 4] = [5, 10, 25, 50];
const DEFAULT_PER_PAGE: u32 = 10;
/// 作者搜索最多返回的条数
const AUTHOR_OPTIONS_LIMIT: i64 = 50;

/// 配置后台路由。
///
/// 文章资源位于 `/posts` 下：
/// - `GET /posts`：表格
/// - `GET|POST /posts/create`：新建页与提交
/// - `GET|POST /posts/{record}/edit`：编辑页与提交
/// - `POST /posts/create/title`、`POST /posts/{record}/edit/title`：标题联动
/// - `POST /posts/{record}/featured`：表格中直接修改推荐标记
/// - `POST /posts/bulk`：批量操作
///
/// 以及下拉框选项 `GET /authors`、`GET /categories`。
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/create", get(create_page).post(create_post))
        .route("/posts/create/title", post(create_title_updated))
        .route("/posts/bulk", post(bulk_action))
        .route("/posts/{record}/edit", get(edit_page).post(update_post))
        .route("/posts/{record}/edit/title", post(edit_title_updated))
        .route("/posts/{record}/featured", post(update_featured))
        .route("/authors", get(author_options))
        .route("/categories", get(category_options))
}

/// 表格查询参数
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListParams {
    trashed: TrashedFilter,
    /// 排序列，只接受可排序的列
    sort: Option<String>,
    direction: SortDirection,
    search: String,
    page: u32,
    per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            trashed: TrashedFilter::default(),
            sort: None,
            direction: SortDirection::Asc,
            search: String::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// 表格页响应
#[derive(Debug, Serialize)]
pub struct ListPage {
    table: TableSchema,
    rows: Vec<Map<String, Value>>,
    pagination: CountedPaginator,
}

/// 表单页响应
#[derive(Debug, Serialize)]
pub struct FormPage {
    operation: FormOperation,
    form: FormSchema,
    state: PostForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<i64>,
    trashed: bool,
}

/// 保存成功后的响应
#[derive(Debug, Serialize)]
pub struct Saved {
    id: i64,
    slug: String,
    redirect: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleUpdate {
    title: String,
    #[serde(default)]
    state: PostForm,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    action: BulkAction,
    records: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
    action: BulkAction,
    affected: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FeaturedUpdate {
    featured: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OptionSearch {
    search: String,
}

fn edit_url(id: i64) -> String {
    format!("/admin/posts/{}/edit", id)
}

/// 文章表格。
///
/// 不受软删除范围限制，由 `trashed` 参数决定是否显示已删除的文章。
async fn list_posts(
    Query(params): Query<ListParams>,
    State(pool): State<DBPool>,
) -> Result<Json<ListPage>> {
    let table = PostResource::table();

    let sort = match params.sort.as_deref() {
        None | Some("") => None,
        Some(column) if table.is_sortable(column) => Some(params.direction),
        Some(_) => return Err(Error::BadRequest("unsortable column")),
    };

    let per_page = if PER_PAGE_OPTIONS.contains(&params.per_page) {
        params.per_page
    } else {
        DEFAULT_PER_PAGE
    };
    let page = params.page.max(1);

    let (rows, total) = pool
        .admin_list(&AdminListFilter {
            trashed: params.trashed,
            sort,
            search: if table.is_searchable() {
                params.search.trim()
            } else {
                ""
            },
            limit: i64::from(per_page),
            offset: pagination::offset(page, per_page),
        })
        .await?;

    let page = CountedPage {
        items: rows,
        page,
        per_page,
        total,
    };

    Ok(Json(ListPage {
        rows: page.items.iter().map(|row| table.render_row(row)).collect(),
        pagination: page.paginator(),
        table,
    }))
}

async fn create_page() -> Json<FormPage> {
    Json(FormPage {
        operation: FormOperation::Create,
        form: PostResource::form(),
        state: PostForm::default(),
        record: None,
        trashed: false,
    })
}

#[instrument(skip_all)]
async fn create_post(
    State(pool): State<DBPool>,
    Json(mut form): Json<PostForm>,
) -> Result<(StatusCode, Json<Saved>)> {
    form.prepare(FormOperation::Create, None);
    PostResource::validate(&pool, FormOperation::Create, &form, None).await?;

    let mut tx = pool.begin().await?;
    let id = tx.insert_post(&form).await?;
    tx.sync_categories(id, &form.categories).await?;
    tx.commit().await?;

    tracing::info!(id, slug = %form.slug, "post created");

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            id,
            slug: form.slug,
            redirect: edit_url(id),
        }),
    ))
}

/// 编辑页，已软删除的文章也可以编辑。
async fn edit_page(Path(record): Path<i64>, State(pool): State<DBPool>) -> Result<Json<FormPage>> {
    let post = pool.find_post(record).await?.ok_or(Error::NotFound)?;
    let trashed = post.row.is_trashed();

    Ok(Json(FormPage {
        operation: FormOperation::Edit,
        form: PostResource::form(),
        state: PostForm::from(post),
        record: Some(record),
        trashed,
    }))
}

#[instrument(skip_all)]
async fn update_post(
    Path(record): Path<i64>,
    State(pool): State<DBPool>,
    Json(mut form): Json<PostForm>,
) -> Result<Json<Saved>> {
    let current = pool.find_post(record).await?.ok_or(Error::NotFound)?;

    form.prepare(FormOperation::Edit, Some(&current.row.slug));
    PostResource::validate(&pool, FormOperation::Edit, &form, Some(record)).await?;

    let mut tx = pool.begin().await?;
    if !tx.update_post(record, &form).await? {
        return Err(Error::NotFound);
    }
    tx.sync_categories(record, &form.categories).await?;
    tx.commit().await?;

    tracing::info!(id = record, slug = %form.slug, "post updated");

    Ok(Json(Saved {
        id: record,
        slug: form.slug,
        redirect: edit_url(record),
    }))
}

/// 新建页的标题联动，slug 随标题生成。
async fn create_title_updated(Json(update): Json<TitleUpdate>) -> Json<PostForm> {
    let mut state = update.state;
    state.title_updated(FormOperation::Create, update.title);
    Json(state)
}

/// 编辑页的标题联动，slug 保持不变。
async fn edit_title_updated(
    Path(_record): Path<i64>,
    Json(update): Json<TitleUpdate>,
) -> Json<PostForm> {
    let mut state = update.state;
    state.title_updated(FormOperation::Edit, update.title);
    Json(state)
}

#[instrument(skip_all)]
async fn update_featured(
    Path(record): Path<i64>,
    State(pool): State<DBPool>,
    Json(update): Json<FeaturedUpdate>,
) -> Result<Json<FeaturedUpdate>> {
    let mut storage = &pool;
    if !storage.set_featured(record, update.featured).await? {
        return Err(Error::NotFound);
    }
    Ok(Json(update))
}

/// 批量软删除、彻底删除或恢复。
#[instrument(skip_all)]
async fn bulk_action(
    State(pool): State<DBPool>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResult>> {
    let mut storage = &pool;

    let affected = match request.action {
        BulkAction::Delete => storage.soft_delete(&request.records).await?,
        BulkAction::ForceDelete => storage.force_delete(&request.records).await?,
        BulkAction::Restore => storage.restore(&request.records).await?,
    };

    tracing::info!(action = ?request.action, affected, "bulk action applied");

    Ok(Json(BulkResult {
        action: request.action,
        affected,
    }))
}

/// 作者下拉框的搜索选项。
async fn author_options(
    Query(params): Query<OptionSearch>,
    State(pool): State<DBPool>,
) -> Result<Json<Vec<Author>>> {
    pool.authors(params.search.trim(), AUTHOR_OPTIONS_LIMIT)
        .await
        .map(Json)
        .map_err(Into::into)
}

/// 分类下拉框的预加载选项。
async fn category_options(State(pool): State<DBPool>) -> Result<Json<Vec<Category>>> {
    pool.categories().await.map(Json).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params = ListParams::default();
        assert_eq!(params.trashed, TrashedFilter::Without);
        assert_eq!(params.direction, SortDirection::Asc);
        assert_eq!(params.per_page, DEFAULT_PER_PAGE);
        assert!(PER_PAGE_OPTIONS.contains(&params.per_page));
    }

    #[test]
    fn test_bulk_request() {
        let request: BulkRequest =
            serde_json::from_str(r#"{"action": "restore", "records": [1, 2]}"#)
                .expect("反序列化失败");
        assert_eq!(request.action, BulkAction::Restore);
        assert_eq!(request.records, vec![1, 2]);
    }

    #[test]
    fn test_edit_url() {
        assert_eq!(edit_url(42), "/admin/posts/42/edit");
    }
}
