use serde::Serialize;

/// 字段校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum Rule {
    Required,
    /// 最少字符数
    Min(usize),
    /// 最多字符数
    Max(usize),
    /// 在文章表中唯一，忽略当前编辑的记录
    Unique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    TextInput,
    RichEditor,
    FileUpload,
    DateTimePicker,
    Checkbox,
    Select,
}

/// 下拉框绑定的关联关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub name: &'static str,
    /// 作为选项标签的属性
    pub title_attribute: &'static str,
}

/// 表单字段声明
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// 输入变化时立即回传
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub live: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub column_span_full: bool,
    /// 上传文件保存的目录
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub searchable: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub preload: bool,
}

impl Field {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            rules: Vec::new(),
            live: false,
            nullable: false,
            column_span_full: false,
            directory: None,
            image: false,
            relationship: None,
            multiple: false,
            searchable: false,
            preload: false,
        }
    }

    pub fn text_input(name: &'static str) -> Self {
        Self::new(name, FieldKind::TextInput)
    }

    pub fn rich_editor(name: &'static str) -> Self {
        Self::new(name, FieldKind::RichEditor)
    }

    pub fn file_upload(name: &'static str) -> Self {
        Self::new(name, FieldKind::FileUpload)
    }

    pub fn date_time_picker(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTimePicker)
    }

    pub fn checkbox(name: &'static str) -> Self {
        Self::new(name, FieldKind::Checkbox)
    }

    pub fn select(name: &'static str) -> Self {
        Self::new(name, FieldKind::Select)
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn live(mut self) -> Self {
        self.live = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn column_span_full(mut self) -> Self {
        self.column_span_full = true;
        self
    }

    pub fn directory(mut self, directory: &'static str) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn image(mut self) -> Self {
        self.image = true;
        self
    }

    pub fn relationship(mut self, name: &'static str, title_attribute: &'static str) -> Self {
        self.relationship = Some(Relationship {
            name,
            title_attribute,
        });
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn preload(mut self) -> Self {
        self.preload = true;
        self
    }

    /// 用于错误信息的字段名，如 `published_at` → `published at`
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// 表单分组
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub heading: &'static str,
    pub columns: u8,
    pub fields: Vec<Field>,
}

impl Section {
    pub fn make(heading: &'static str) -> Self {
        Self {
            heading,
            columns: 1,
            fields: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: u8) -> Self {
        self.columns = columns;
        self
    }

    pub fn schema(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }
}

/// 表单声明
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub sections: Vec<Section>,
}

impl FormSchema {
    pub fn new(sections: impl IntoIterator<Item = Section>) -> Self {
        Self {
            sections: sections.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name == name)
    }
}
