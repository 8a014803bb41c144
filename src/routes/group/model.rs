use serde::{Deserialize, Serialize};

/// 群组成员资格查询参数，pk 与 name 至少给出一个
#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub pk: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub in_group: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddGroupUserRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RemoveGroupUserResponse {
    /// 用户原本是否在该群组中
    pub removed: bool,
}
