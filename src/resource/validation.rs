use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::form::{FieldKind, FormSchema, Rule};
use crate::{content::PostForm, uploads};

/// 按字段收集的校验错误
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// 没有错误时返回 `Ok(())`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// 表单字段的取值
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    OptionalText(Option<&'a str>),
    Key(Option<i64>),
    Keys(&'a [i64]),
    Flag(bool),
    Moment(Option<&'a DateTime<Local>>),
}

impl FieldValue<'_> {
    /// 是否填写了值，空白字符串视为未填写
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::OptionalText(s) => s.is_some_and(|s| !s.trim().is_empty()),
            FieldValue::Key(k) => k.is_some(),
            FieldValue::Keys(ks) => !ks.is_empty(),
            FieldValue::Flag(_) => true,
            FieldValue::Moment(m) => m.is_some(),
        }
    }

    /// 文本长度（字符数），非文本值返回 `None`
    pub fn char_len(&self) -> Option<usize> {
        match self {
            FieldValue::Text(s) => Some(s.chars().count()),
            FieldValue::OptionalText(s) => s.map(|s| s.chars().count()),
            _ => None,
        }
    }
}

/// 可被 [`FormSchema`] 校验的表单状态
pub trait FormState {
    fn value(&self, field: &str) -> Option<FieldValue<'_>>;
}

impl FormState for PostForm {
    fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "title" => FieldValue::Text(&self.title),
            "slug" => FieldValue::Text(&self.slug),
            "body" => FieldValue::Text(&self.body),
            "image" => FieldValue::OptionalText(self.image.as_deref()),
            "published_at" => FieldValue::Moment(self.published_at.as_ref()),
            "featured" => FieldValue::Flag(self.featured),
            "author" => FieldValue::Key(self.author),
            "categories" => FieldValue::Keys(&self.categories),
            _ => return None,
        };
        Some(value)
    }
}

/// 按声明的规则校验表单中不依赖数据库的部分
///
/// 未填写的字段只检查 `required`，其余规则跳过；[`Rule::Unique`] 需要查询数据库，这里不处理。
/// 声明了目录的上传字段，其路径必须位于该目录下。
pub fn check_rules(schema: &FormSchema, state: &impl FormState) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for field in schema.fields() {
        let Some(value) = state.value(field.name) else {
            continue;
        };
        let label = field.label();

        if !value.is_filled() {
            if field.rules.contains(&Rule::Required) {
                errors.add(field.name, format!("The {label} field is required."));
            }
            continue;
        }

        for rule in &field.rules {
            match (rule, value.char_len()) {
                (Rule::Min(min), Some(len)) if len < *min => errors.add(
                    field.name,
                    format!("The {label} field must be at least {min} characters."),
                ),
                (Rule::Max(max), Some(len)) if len > *max => errors.add(
                    field.name,
                    format!("The {label} field must not be greater than {max} characters."),
                ),
                _ => (),
            }
        }

        if let (FieldKind::FileUpload, Some(directory), FieldValue::OptionalText(Some(path))) =
            (field.kind, field.directory, value)
        {
            if !uploads::is_within(path, directory) {
                errors.add(
                    field.name,
                    format!("The {label} field must be a file uploaded to {directory}."),
                );
            }
        }
    }

    errors
}
