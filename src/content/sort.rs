use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 按发布时间排序的方向
///
/// 只有字面量 `desc` 被视为降序，其余任意取值都归为升序；缺省为降序。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn from_value(value: &str) -> Self {
        match value {
            "desc" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// SQL 中的排序关键字
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value() {
        assert_eq!(SortDirection::from_value("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::from_value("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::from_value("DESC"), SortDirection::Asc);
        assert_eq!(SortDirection::from_value("random"), SortDirection::Asc);
    }

    #[test]
    fn test_default_is_desc() {
        assert_eq!(SortDirection::default(), SortDirection::Desc);
    }

    #[test]
    fn test_serde() {
        let dir: SortDirection = serde_json::from_str(r#""whatever""#).expect("反序列化失败");
        assert_eq!(dir, SortDirection::Asc);
        assert_eq!(
            serde_json::to_string(&SortDirection::Desc).expect("序列化失败"),
            r#""desc""#
        );
    }
}
