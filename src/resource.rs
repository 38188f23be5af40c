//! 后台文章资源
//!
//! 表单与表格以声明式的 [`FormSchema`]、[`TableSchema`] 描述，前端据此渲染；
//! 服务端校验也直接读取同一份声明中的规则。

mod form;
mod table;
mod validation;

pub use self::{
    form::{Field, FieldKind, FormSchema, Relationship, Rule, Section},
    table::{
        Attribute, BulkAction, Column, ColumnKind, RecordAction, TableFilter, TableRecord,
        TableSchema, limit,
    },
    validation::{FieldValue, FormState, ValidationErrors, check_rules},
};

use crate::{
    content::{FormOperation, PostForm},
    error::Result,
    storage::Querier,
    uploads::UploadDirectory,
};

/// 表格中发布时间的显示格式，即 `d/m/Y`
pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub struct PostResource;

impl PostResource {
    /// 文章表单
    ///
    /// - Main Content：标题、slug、正文
    /// - Meta：封面图、发布时间、推荐、作者、分类
    pub fn form() -> FormSchema {
        FormSchema::new([
            Section::make("Main Content").columns(2).schema([
                Field::text_input("title")
                    .rules([Rule::Required, Rule::Min(3), Rule::Max(150)])
                    .live(),
                Field::text_input("slug").rules([Rule::Required, Rule::Max(150), Rule::Unique]),
                Field::rich_editor("body")
                    .rules([Rule::Required])
                    .directory(UploadDirectory::Images.path())
                    .column_span_full(),
            ]),
            Section::make("Meta").schema([
                Field::file_upload("image")
                    .image()
                    .directory(UploadDirectory::Thumbnails.path()),
                Field::date_time_picker("published_at").nullable(),
                Field::checkbox("featured"),
                Field::select("author")
                    .relationship("author", "name")
                    .rules([Rule::Required])
                    .searchable(),
                Field::select("categories")
                    .relationship("categories", "title")
                    .rules([Rule::Required])
                    .multiple()
                    .preload(),
            ]),
        ])
    }

    /// 文章表格
    pub fn table() -> TableSchema {
        TableSchema {
            columns: vec![
                Column::image("image"),
                Column::text("title").limit(50),
                Column::text("slug").limit(10),
                Column::text("author.name"),
                Column::text("body").limit(20),
                Column::text("published_at")
                    .date(DATE_FORMAT)
                    .sortable()
                    .searchable(),
                Column::checkbox("featured"),
            ],
            filters: vec![TableFilter::trashed()],
            actions: vec![RecordAction::Edit],
            bulk_actions: vec![
                BulkAction::Delete,
                BulkAction::ForceDelete,
                BulkAction::Restore,
            ],
        }
    }

    /// 校验提交的表单
    ///
    /// 先检查不依赖数据库的规则，再检查 slug 唯一性（忽略 `record`）以及作者、分类是否存在。
    /// 所有错误汇总后以 [`crate::error::Error::Validation`] 返回。
    pub async fn validate<Q: Querier>(
        querier: &Q,
        operation: FormOperation,
        form: &PostForm,
        record: Option<i64>,
    ) -> Result<()> {
        let schema = Self::form();
        let mut errors = check_rules(&schema, form);

        let ignore = match operation {
            FormOperation::Create => None,
            FormOperation::Edit => record,
        };

        for field in schema.fields() {
            if !field.rules.contains(&Rule::Unique) || errors.has(field.name) {
                continue;
            }
            if let Some(FieldValue::Text(value)) = form.value(field.name) {
                if querier.slug_taken(value, ignore).await? {
                    errors.add(
                        field.name,
                        format!("The {} has already been taken.", field.label()),
                    );
                }
            }
        }

        if let Some(author) = form.author {
            if !querier.author_exists(author).await? {
                errors.add("author", "The selected author is invalid.");
            }
        }

        if !form.categories.is_empty() {
            let existing = querier.existing_category_ids(&form.categories).await?;
            if form.categories.iter().any(|id| !existing.contains(id)) {
                errors.add("categories", "The selected categories is invalid.");
            }
        }

        if !errors.is_empty() {
            tracing::debug!(?errors, "post form rejected");
        }

        errors.into_result().map_err(Into::into)
    }
}
