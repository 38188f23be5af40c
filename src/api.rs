mod admin;
mod blog;
mod upload;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::instrument;

use crate::{
    error::{Error, Result},
    state::AppState,
    uploads::PUBLIC_PREFIX,
};

/// 设置应用的路由。
///
/// - `/`、`/blog`：公开页面
/// - `/admin`：后台文章资源、选项与上传
/// - `/storage`：已上传的文件
pub fn setup_route(app: AppState) -> Router {
    let storage_root = app.uploads().root().to_path_buf();

    Router::new()
        .merge(blog::setup_route())
        .nest("/admin", admin::setup_route().merge(upload::setup_route()))
        .nest_service(PUBLIC_PREFIX, ServeDir::new(storage_root))
        .with_state(app)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;

    tracing::info!("listening on {}", listen);

    axum::serve(listener, router).await.map_err(Error::from)
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server(app: AppState, listen: &str) -> Result<()> {
    let router = setup_route(app);
    let router = add_middlewares(router);
    run_server_with_router(router, listen).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
///
/// 日志记录会在请求失败时输出错误信息。
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 空实现，关闭请求日志
            }),
    )
}
