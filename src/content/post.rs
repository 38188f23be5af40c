use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// 表单当前所处的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormOperation {
    Create,
    Edit,
}

/// 后台文章表单的状态
///
/// 既是提交的数据，也是编辑页回填的数据。`author` 与 `categories` 保存关联记录的 id。
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub image: Option<String>,
    #[serde(with = "form_datetime")]
    pub published_at: Option<DateTime<Local>>,
    pub featured: bool,
    pub author: Option<i64>,
    pub categories: Vec<i64>,
}

/// 由标题生成 slug，如 `My First Post` → `my-first-post`
pub fn derive_slug(title: &str) -> String {
    slug::slugify(title)
}

impl PostForm {
    /// 标题输入变化后的联动
    ///
    /// 只有新建时才根据标题改写 slug，编辑时 slug 保持不变。
    pub fn title_updated(&mut self, operation: FormOperation, title: impl Into<String>) {
        self.title = title.into();

        if operation == FormOperation::Edit {
            return;
        }

        self.slug = derive_slug(&self.title);
    }

    /// 提交前整理表单
    ///
    /// - 去除标题和 slug 两端空白，空的图片路径视为未上传
    /// - 新建时 slug 为空则由标题生成
    /// - 编辑时 slug 为空则沿用 `current_slug`，标题的修改不会影响 slug
    pub fn prepare(&mut self, operation: FormOperation, current_slug: Option<&str>) {
        self.title = self.title.trim().to_string();
        self.slug = self.slug.trim().to_string();
        self.image = self
            .image
            .take()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());

        if !self.slug.is_empty() {
            return;
        }

        match (operation, current_slug) {
            (FormOperation::Create, _) => self.slug = derive_slug(&self.title),
            (FormOperation::Edit, Some(current)) => self.slug = current.to_string(),
            (FormOperation::Edit, None) => (),
        }
    }
}

/// 日期时间选择器的序列化格式
///
/// 输出 `%Y-%m-%d %H:%M:%S`，输入额外接受 `T` 分隔、省略秒、纯日期和 RFC 3339。
/// 空字符串与 `null` 都视为未设置。
mod form_datetime {
    use super::*;
    use serde::{Deserializer, Serializer};

    const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<DateTime<Local>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(OUTPUT_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }

        parse_to_local(s).map(Some).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_to_local(s: &str) -> Result<DateTime<Local>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Local));
        }

        for fmt in &[
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
        ] {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return from_local(naive_dt);
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return match date.and_hms_opt(0, 0, 0) {
                Some(naive_dt) => from_local(naive_dt),
                None => Err("无法构建时间".to_string()),
            };
        }

        Err(format!("无法解析日期: {}", s))
    }

    fn from_local(naive_dt: NaiveDateTime) -> Result<DateTime<Local>, String> {
        Local
            .from_local_datetime(&naive_dt)
            .earliest()
            .ok_or_else(|| "本地时间不存在".to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("My First Post"), "my-first-post");
        assert_eq!(derive_slug("  Hello, World!  "), "hello-world");
        assert_eq!(derive_slug(""), "");
    }

    #[test]
    fn test_title_updated_on_create_derives_slug() {
        let mut form = PostForm::default();
        form.title_updated(FormOperation::Create, "My First Post");

        assert_eq!(form.title, "My First Post");
        assert_eq!(form.slug, "my-first-post");
    }

    #[test]
    fn test_title_updated_on_edit_keeps_slug() {
        let mut form = PostForm {
            title: "My First Post".to_string(),
            slug: "my-first-post".to_string(),
            ..Default::default()
        };
        form.title_updated(FormOperation::Edit, "A Renamed Post");

        assert_eq!(form.title, "A Renamed Post");
        assert_eq!(form.slug, "my-first-post");
    }

    #[test]
    fn test_prepare_create_fills_blank_slug() {
        let mut form = PostForm {
            title: "  My First Post ".to_string(),
            image: Some("   ".to_string()),
            ..Default::default()
        };
        form.prepare(FormOperation::Create, None);

        assert_eq!(form.title, "My First Post");
        assert_eq!(form.slug, "my-first-post");
        assert!(form.image.is_none());
    }

    #[test]
    fn test_prepare_create_keeps_explicit_slug() {
        let mut form = PostForm {
            title: "My First Post".to_string(),
            slug: "custom-slug".to_string(),
            ..Default::default()
        };
        form.prepare(FormOperation::Create, None);

        assert_eq!(form.slug, "custom-slug");
    }

    #[test]
    fn test_prepare_edit_never_derives_from_title() {
        let mut form = PostForm {
            title: "Brand New Title".to_string(),
            ..Default::default()
        };
        form.prepare(FormOperation::Edit, Some("my-first-post"));
        assert_eq!(form.slug, "my-first-post");

        let mut form = PostForm {
            title: "Brand New Title".to_string(),
            slug: "renamed-on-purpose".to_string(),
            ..Default::default()
        };
        form.prepare(FormOperation::Edit, Some("my-first-post"));
        assert_eq!(form.slug, "renamed-on-purpose");
    }

    #[test]
    fn test_deserialize_form() {
        let form: PostForm = serde_json::from_str(
            r#"{
                "title": "Hello",
                "body": "<p>Hi</p>",
                "published_at": "2024-06-01 08:30:00",
                "author": 1,
                "categories": [1, 2]
            }"#,
        )
        .expect("反序列化失败");

        assert_eq!(form.title, "Hello");
        assert_eq!(form.slug, "");
        assert!(!form.featured);
        assert_eq!(form.author, Some(1));
        assert_eq!(form.categories, vec![1, 2]);

        let published_at = form.published_at.expect("应有发布时间");
        assert_eq!(published_at.year(), 2024);
        assert_eq!(published_at.day(), 1);
        assert_eq!(published_at.hour(), 8);
        assert_eq!(published_at.minute(), 30);
    }

    #[test]
    fn test_published_at_empty_and_null() {
        let form: PostForm =
            serde_json::from_str(r#"{"published_at": ""}"#).expect("反序列化失败");
        assert!(form.published_at.is_none());

        let form: PostForm =
            serde_json::from_str(r#"{"published_at": null}"#).expect("反序列化失败");
        assert!(form.published_at.is_none());
    }

    #[test]
    fn test_published_at_formats() {
        for s in [
            "2024-06-01T08:30",
            "2024-06-01 08:30",
            "2024-06-01T08:30:00",
            "2024-06-01",
            "2024-06-01T08:30:00+00:00",
        ] {
            assert!(
                form_datetime::parse_to_local(s).is_ok(),
                "应能解析 {}",
                s
            );
        }
        assert!(form_datetime::parse_to_local("01/06/2024").is_err());
    }

    #[test]
    fn test_serialize_published_at() {
        let mut form = PostForm::default();
        form.published_at = Some(
            Local
                .with_ymd_and_hms(2024, 6, 1, 8, 30, 0)
                .single()
                .expect("构建时间失败"),
        );
        let value = serde_json::to_value(&form).expect("序列化失败");
        assert_eq!(value["published_at"], "2024-06-01 08:30:00");
    }
}
