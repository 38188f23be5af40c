use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::post,
};
use serde::Serialize;

use super::{Error, Result};
use crate::{
    state::AppState,
    uploads::{self, UploadDirectory, UploadStorage},
};

/// 配置上传路由。
///
/// - `POST /uploads/thumbnails`：封面图
/// - `POST /uploads/images`：正文附件
///
/// 请求为 multipart/form-data，文件字段名为 `file`。
pub fn setup_route() -> Router<AppState> {
    Router::new().route("/uploads/{directory}", post(upload_file))
}

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    /// 保存到文章中的相对路径
    path: String,
    url: String,
}

async fn upload_file(
    Path(directory): Path<UploadDirectory>,
    State(storage): State<UploadStorage>,
    mut multipart: Multipart,
) -> Result<Json<UploadedFile>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !uploads::is_image(&content_type) {
            return Err(Error::BadRequest("The file must be an image."));
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        let path = storage.store(directory, &file_name, &data).await?;
        let url = uploads::public_url(&path);

        return Ok(Json(UploadedFile { path, url }));
    }

    Err(Error::BadRequest("No file provided."))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        extract::Request,
        http::StatusCode,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    use crate::{api, state::AppState, uploads::UploadStorage};

    const BOUNDARY: &str = "blogdesk-boundary";

    /// 不会真正连接数据库的路由，上传不访问数据库
    fn router(root: &std::path::Path) -> axum::Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://blogdesk@localhost/blogdesk")
            .expect("创建连接池失败");
        api::setup_route(AppState::new(pool, UploadStorage::new(root)))
    }

    fn multipart(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Body {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn upload_request(uri: &str, body: Body) -> Request<Body> {
        Request::post(uri)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .expect("请求失败")
    }

    #[tokio::test]
    async fn test_upload_image_is_served() {
        let root = tempfile::tempdir().expect("创建临时目录失败");
        let app = router(root.path());

        let resp = app
            .clone()
            .oneshot(upload_request(
                "/admin/uploads/thumbnails",
                multipart("file", "My Cover.png", "image/png", b"fake-png"),
            ))
            .await
            .expect("oneshot fail");
        assert_eq!(resp.status(), StatusCode::OK, "上传图片");

        let data = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("读取数据失败");
        let uploaded: serde_json::Value = serde_json::from_slice(&data).expect("反序列化失败");

        let path = uploaded["path"].as_str().expect("应返回 path");
        assert!(path.starts_with("posts/thumbnails/"), "{}", path);
        assert!(path.ends_with("-my-cover.png"), "{}", path);

        let url = uploaded["url"].as_str().expect("应返回 url");
        assert_eq!(url, format!("/storage/{}", path));

        let resp = app
            .oneshot(Request::get(url).body(Body::empty()).expect("请求失败"))
            .await
            .expect("oneshot fail");
        assert_eq!(resp.status(), StatusCode::OK, "访问已上传的文件");

        let data = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("读取数据失败");
        assert_eq!(&data[..], b"fake-png");
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let root = tempfile::tempdir().expect("创建临时目录失败");
        let app = router(root.path());

        let cases = [
            (
                "/admin/uploads/images",
                multipart("file", "page.html", "text/html", b"<html></html>"),
                "非图片类型",
            ),
            (
                "/admin/uploads/images",
                multipart("attachment", "cover.png", "image/png", b"fake-png"),
                "缺少 file 字段",
            ),
            (
                "/admin/uploads/documents",
                multipart("file", "cover.png", "image/png", b"fake-png"),
                "未知的上传目录",
            ),
        ];

        for (uri, body, msg) in cases {
            let resp = app
                .clone()
                .oneshot(upload_request(uri, body))
                .await
                .expect("oneshot fail");
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", msg);
        }

        let stored = std::fs::read_dir(root.path()).map(|d| d.count()).unwrap_or(0);
        assert_eq!(stored, 0, "被拒绝的上传不应写入文件");
    }
}
