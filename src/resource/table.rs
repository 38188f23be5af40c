use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{content::TrashedFilter, storage::PostRow, uploads};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Image,
    Text,
    /// 可在表格中直接勾选修改
    Checkbox,
}

/// 表格列声明
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    /// 属性名，关联属性用 `.` 连接，如 `author.name`
    pub name: &'static str,
    pub kind: ColumnKind,
    /// 最多显示的字符数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// chrono 日期格式
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sortable: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub searchable: bool,
}

impl Column {
    fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            limit: None,
            date_format: None,
            sortable: false,
            searchable: false,
        }
    }

    pub fn image(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Image)
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub fn checkbox(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Checkbox)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn date(mut self, format: &'static str) -> Self {
        self.date_format = Some(format);
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// 渲染单元格
    pub fn cell(&self, record: &impl TableRecord) -> Value {
        match record.attribute(self.name) {
            Some(Attribute::Text(s)) => match self.limit {
                Some(n) => Value::String(limit(s, n)),
                None => Value::String(s.to_string()),
            },
            Some(Attribute::Path(Some(path))) => Value::String(uploads::public_url(path)),
            Some(Attribute::Moment(Some(dt))) => match self.date_format {
                Some(fmt) => Value::String(dt.format(fmt).to_string()),
                None => Value::String(dt.to_rfc3339()),
            },
            Some(Attribute::Flag(b)) => Value::Bool(b),
            Some(Attribute::Path(None)) | Some(Attribute::Moment(None)) | None => Value::Null,
        }
    }
}

/// 截断到 `max` 个字符，超出时追加 `...`
pub fn limit(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// 表格行中某一属性的取值
#[derive(Debug, Clone, Copy)]
pub enum Attribute<'a> {
    Text(&'a str),
    /// 上传文件的相对路径
    Path(Option<&'a str>),
    Moment(Option<DateTime<Local>>),
    Flag(bool),
}

/// 可被 [`TableSchema`] 渲染的记录
pub trait TableRecord {
    fn key(&self) -> i64;
    fn is_trashed(&self) -> bool;
    fn attribute(&self, name: &str) -> Option<Attribute<'_>>;
}

impl TableRecord for PostRow {
    fn key(&self) -> i64 {
        self.id
    }

    fn is_trashed(&self) -> bool {
        PostRow::is_trashed(self)
    }

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        let attribute = match name {
            "image" => Attribute::Path(self.image.as_deref()),
            "title" => Attribute::Text(&self.title),
            "slug" => Attribute::Text(&self.slug),
            "body" => Attribute::Text(&self.body),
            "author.name" => Attribute::Text(&self.author_name),
            "published_at" => Attribute::Moment(self.published_at),
            "featured" => Attribute::Flag(self.featured),
            _ => return None,
        };
        Some(attribute)
    }
}

/// 批量操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    /// 软删除
    Delete,
    /// 彻底删除
    ForceDelete,
    /// 恢复软删除
    Restore,
}

/// 单条记录的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordAction {
    Edit,
}

/// 表格筛选器
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableFilter {
    Trashed {
        name: &'static str,
        options: Vec<FilterOption>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    pub value: TrashedFilter,
    pub label: &'static str,
}

impl TableFilter {
    pub fn trashed() -> Self {
        let options = [
            TrashedFilter::Without,
            TrashedFilter::With,
            TrashedFilter::Only,
        ]
        .into_iter()
        .map(|value| FilterOption {
            value,
            label: value.label(),
        })
        .collect();

        TableFilter::Trashed {
            name: "trashed",
            options,
        }
    }
}

/// 表格声明
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub columns: Vec<Column>,
    pub filters: Vec<TableFilter>,
    pub actions: Vec<RecordAction>,
    pub bulk_actions: Vec<BulkAction>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        self.column(name).is_some_and(|c| c.sortable)
    }

    pub fn is_searchable(&self) -> bool {
        self.columns.iter().any(|c| c.searchable)
    }

    /// 渲染一行，附带记录 id 与是否已软删除
    pub fn render_row(&self, record: &impl TableRecord) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("id".to_string(), Value::from(record.key()));
        row.insert("trashed".to_string(), Value::Bool(record.is_trashed()));

        for column in &self.columns {
            row.insert(column.name.to_string(), column.cell(record));
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::resource::PostResource;

    fn sample_row() -> PostRow {
        let at = Local
            .with_ymd_and_hms(2024, 6, 1, 8, 30, 0)
            .single()
            .expect("构建时间失败");

        PostRow {
            id: 7,
            title: "A fairly long title that goes on and on and on until it is cut".to_string(),
            slug: "a-fairly-long-title".to_string(),
            body: "<p>Some rich text body</p>".to_string(),
            image: Some("posts/thumbnails/cover.png".to_string()),
            published_at: Some(at),
            featured: true,
            author_id: 1,
            author_name: "Alice".to_string(),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit("short", 10), "short");
        assert_eq!(limit("exactly10!", 10), "exactly10!");
        assert_eq!(limit("hello world", 5), "hello...");
        assert_eq!(limit("你好世界", 2), "你好...");
    }

    #[test]
    fn test_render_row() {
        let table = PostResource::table();
        let row = table.render_row(&sample_row());

        assert_eq!(row["id"], 7);
        assert_eq!(row["trashed"], false);
        assert_eq!(row["image"], "/storage/posts/thumbnails/cover.png");
        assert_eq!(
            row["title"],
            "A fairly long title that goes on and on and on unt..."
        );
        assert_eq!(row["slug"], "a-fairly-l...");
        assert_eq!(row["author.name"], "Alice");
        assert_eq!(row["body"], "<p>Some rich text bo...");
        assert_eq!(row["published_at"], "01/06/2024");
        assert_eq!(row["featured"], true);
    }

    #[test]
    fn test_render_row_nulls() {
        let table = PostResource::table();
        let mut record = sample_row();
        record.image = None;
        record.published_at = None;
        record.deleted_at = Some(record.created_at);

        let row = table.render_row(&record);
        assert!(row["image"].is_null());
        assert!(row["published_at"].is_null());
        assert_eq!(row["trashed"], true);
    }

    #[test]
    fn test_sortable() {
        let table = PostResource::table();
        assert!(table.is_sortable("published_at"));
        assert!(!table.is_sortable("title"));
        assert!(!table.is_sortable("missing"));
        assert!(table.is_searchable());
    }

    #[test]
    fn test_bulk_action_serde() {
        let action: BulkAction = serde_json::from_str(r#""force_delete""#).expect("反序列化失败");
        assert_eq!(action, BulkAction::ForceDelete);
        assert!(serde_json::from_str::<BulkAction>(r#""archive""#).is_err());
    }
}
