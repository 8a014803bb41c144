use std::fmt;

use crate::error::AppError;

/// 按ID或按名称引用一个群组
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    ById(i64),
    ByName(String),
}

impl GroupRef {
    /// 由可选的查询参数构造。两者都给出时以ID为准，都没有时返回参数错误
    pub fn from_parts(pk: Option<i64>, name: Option<String>) -> Result<Self, AppError> {
        match (pk, name) {
            (Some(pk), _) => Ok(GroupRef::ById(pk)),
            (None, Some(name)) if !name.is_empty() => Ok(GroupRef::ByName(name)),
            _ => Err(AppError::InvalidArgument(
                "either the group pk or the group name must be given".to_string(),
            )),
        }
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::ById(id) => write!(f, "group #{}", id),
            GroupRef::ByName(name) => write!(f, "group '{}'", name),
        }
    }
}
