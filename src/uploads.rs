use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Local};
use serde::Deserialize;
use tokio::{fs, io::AsyncWriteExt};

/// 上传文件对外访问的 URL 前缀
pub const PUBLIC_PREFIX: &str = "/storage";

const MAX_NAME_ATTEMPTS: u32 = 16;

/// 上传目录
///
/// - [`UploadDirectory::Thumbnails`]：文章封面图
/// - [`UploadDirectory::Images`]：正文中的附件图片
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadDirectory {
    Thumbnails,
    Images,
}

impl UploadDirectory {
    pub fn path(&self) -> &'static str {
        match self {
            UploadDirectory::Thumbnails => "posts/thumbnails",
            UploadDirectory::Images => "posts/images",
        }
    }
}

/// 相对路径对应的访问 URL
pub fn public_url(path: &str) -> String {
    format!("{}/{}", PUBLIC_PREFIX, path.trim_start_matches('/'))
}

/// 是否为图片类型
pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// `path` 是否为 `directory` 下直接存放的文件，即 [`UploadStorage::store`] 可能返回的路径
pub fn is_within(path: &str, directory: &str) -> bool {
    let Some(name) = path
        .strip_prefix(directory)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return false;
    };

    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// 本地上传存储
///
/// 文件写入 `root/<目录>/` 下，返回相对 `root` 的路径，该路径即保存在文章中的值。
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: Arc<Path>,
}

impl UploadStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::from(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 保存上传文件，返回相对路径
    pub async fn store(
        &self,
        directory: UploadDirectory,
        original_name: &str,
        data: &[u8],
    ) -> io::Result<String> {
        let dir = self.root.join(directory.path());
        fs::create_dir_all(&dir).await?;

        let now = Local::now();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = file_name(original_name, now, attempt);
            let target: PathBuf = dir.join(&name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            file.write_all(data).await?;
            file.flush().await?;

            let relative = format!("{}/{}", directory.path(), name);
            tracing::info!(path = %relative, size = data.len(), "upload stored");
            return Ok(relative);
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "exhausted attempts to find a free upload name",
        ))
    }
}

/// 由上传时间和原文件名生成文件名，如 `1717200000000-my-cover.png`
///
/// 原文件名会被 slug 化，无法 slug 化时使用 `upload`；`attempt` 大于 0 时追加序号避免重名。
fn file_name(original_name: &str, now: DateTime<Local>, attempt: u32) -> String {
    let path = Path::new(original_name);

    let stem = path
        .file_stem()
        .map(|s| slug::slugify(s.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    let suffix = if attempt > 0 {
        format!("-{}", attempt + 1)
    } else {
        String::new()
    };

    match ext {
        Some(ext) => format!("{}-{}{}.{}", now.timestamp_millis(), stem, suffix, ext),
        None => format!("{}-{}{}", now.timestamp_millis(), stem, suffix),
    }
}
