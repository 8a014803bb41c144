// 权限模块
// 判断身份是否属于某个群组，并在成员资格变更时维护缓存

mod group_ref;
mod membership;
mod resolver;
mod roles;

pub use group_ref::GroupRef;
pub use membership::MembershipService;
pub use resolver::GroupResolver;
pub use roles::ClubRole;

/// 当前请求的身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// 未登录访客，只属于 Public 群组
    Anonymous,
    User(UserIdentity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i64,
    pub is_superuser: bool,
}

impl Identity {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user.id),
        }
    }
}

impl From<&crate::database::UserEntity> for Identity {
    fn from(user: &crate::database::UserEntity) -> Self {
        Identity::User(UserIdentity {
            id: user.id,
            is_superuser: user.is_superuser,
        })
    }
}
