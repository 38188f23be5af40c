use axum::extract::FromRef;

use crate::{storage::DBPool, uploads::UploadStorage};

/// 应用程序上下文
///
/// [`AppState`] 封装了数据库连接池和上传存储，处理器可以分别通过 `State<DBPool>`、
/// `State<UploadStorage>` 取用。
#[derive(Clone, FromRef)]
pub struct AppState {
    pool: DBPool,
    uploads: UploadStorage,
}

impl AppState {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(pool: DBPool, uploads: UploadStorage) -> Self {
        Self { pool, uploads }
    }

    /// 获取上传存储
    pub fn uploads(&self) -> &UploadStorage {
        &self.uploads
    }
}
