// 缓存键模块
// 提供各种缓存键生成函数

/// 俱乐部成员资格缓存键前缀
const MEMBERSHIP_PREFIX: &str = "membership_";

/// 群组缓存键前缀
const GROUP_ID_PREFIX: &str = "sith_group_";

/// 群组名称缓存键前缀
const GROUP_NAME_PREFIX: &str = "sith_group_name_";

/// 用户直属群组缓存键前缀
const USER_GROUPS_PREFIX: &str = "user_groups_";

/// 俱乐部缓存键前缀
const CLUB_UNIX_NAME_PREFIX: &str = "club_unix_";

/// 生成 (俱乐部, 用户) 成员资格缓存键
pub fn membership_key(club_id: i64, user_id: i64) -> String {
    format!("{}{}_{}", MEMBERSHIP_PREFIX, club_id, user_id)
}

/// 生成群组ID缓存键
pub fn group_id_key(group_id: i64) -> String {
    format!("{}{}", GROUP_ID_PREFIX, group_id)
}

/// 生成群组名称缓存键
pub fn group_name_key(name: &str) -> String {
    format!("{}{}", GROUP_NAME_PREFIX, name)
}

/// 生成用户直属群组列表缓存键
pub fn user_groups_key(user_id: i64) -> String {
    format!("{}{}", USER_GROUPS_PREFIX, user_id)
}

/// 生成俱乐部短名缓存键
pub fn club_unix_name_key(unix_name: &str) -> String {
    format!("{}{}", CLUB_UNIX_NAME_PREFIX, unix_name)
}
