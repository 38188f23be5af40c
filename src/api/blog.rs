use axum::{Json, Router, extract::State, routing::get, routing::post};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use super::Result;
use crate::{
    listing::PostList,
    pagination::SimplePaginator,
    state::AppState,
    storage::{CategoryRef, DBPool, PostSummary, Querier},
    uploads,
};

/// 首页展示的文章数
const RECENT_POSTS: i64 = 3;

/// 配置公开页面路由。
///
/// - `GET /`：最近发布的文章
/// - `GET /blog`：文章列表，状态来自查询参数
/// - `POST /blog/sort`：切换排序
/// - `POST /blog/search`：推送新的搜索词
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/blog", get(post_list))
        .route("/blog/sort", post(post_list_sort))
        .route("/blog/search", post(post_list_search))
}

/// 文章卡片，用于首页和列表展示。
#[derive(Debug, Serialize)]
pub struct PostCard {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub image: Option<String>,
    pub published_at: i64,
    pub featured: bool,
    pub author: String,
    pub categories: Vec<CategoryRef>,
}

impl From<PostSummary> for PostCard {
    fn from(post: PostSummary) -> Self {
        Self {
            title: post.title,
            slug: post.slug,
            body: post.body,
            image: post.image.as_deref().map(uploads::public_url),
            published_at: post.published_at.timestamp_millis(),
            featured: post.featured,
            author: post.author_name,
            categories: post.categories.0,
        }
    }
}

/// 列表页响应
#[derive(Debug, Serialize)]
pub struct ListingPage {
    /// 当前状态
    state: PostList,
    /// 与状态同步的地址
    url: String,
    posts: Vec<PostCard>,
    pagination: SimplePaginator,
}

#[derive(Debug, Deserialize)]
pub struct SortEvent {
    sort: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchEvent {
    #[serde(default)]
    search: String,
}

/// 最近发布的三篇文章。
async fn home(State(pool): State<DBPool>) -> Result<Json<Vec<PostCard>>> {
    let posts = pool.recent_posts(RECENT_POSTS).await?;
    Ok(Json(posts.into_iter().map(PostCard::from).collect()))
}

async fn post_list(
    Query(list): Query<PostList>,
    State(pool): State<DBPool>,
) -> Result<Json<ListingPage>> {
    render(list, &pool).await
}

/// 切换排序后回到第一页。
async fn post_list_sort(
    Query(mut list): Query<PostList>,
    State(pool): State<DBPool>,
    Json(event): Json<SortEvent>,
) -> Result<Json<ListingPage>> {
    list.set_sort(&event.sort);
    render(list, &pool).await
}

/// 外部推送的搜索词。
async fn post_list_search(
    Query(mut list): Query<PostList>,
    State(pool): State<DBPool>,
    Json(event): Json<SearchEvent>,
) -> Result<Json<ListingPage>> {
    list.update_search(event.search);
    render(list, &pool).await
}

async fn render(list: PostList, pool: &DBPool) -> Result<Json<ListingPage>> {
    let page = list.posts(pool).await?.map(PostCard::from);
    let pagination = page.paginator();

    let query = list.query_string();
    let url = if query.is_empty() {
        "/blog".to_string()
    } else {
        format!("/blog?{}", query)
    };

    Ok(Json(ListingPage {
        state: list,
        url,
        posts: page.items,
        pagination,
    }))
}
