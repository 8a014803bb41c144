// 缓存数据模型
// 定义缓存值的编码方式
use crate::database::models::MembershipEntity;

/// "不是成员" 的缓存哨兵值
pub const NOT_MEMBER: &str = "not_member";

/// 成员资格缓存项：要么是当前有效的成员资格，要么是 "不是成员" 标记
#[derive(Debug, Clone, PartialEq)]
pub enum CachedMembership {
    Active(MembershipEntity),
    NotMember,
}

impl CachedMembership {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        match self {
            CachedMembership::Active(membership) => serde_json::to_string(membership),
            CachedMembership::NotMember => Ok(NOT_MEMBER.to_string()),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        if raw == NOT_MEMBER {
            return Ok(CachedMembership::NotMember);
        }
        serde_json::from_str(raw).map(CachedMembership::Active)
    }
}

impl From<Option<MembershipEntity>> for CachedMembership {
    fn from(membership: Option<MembershipEntity>) -> Self {
        match membership {
            Some(membership) => CachedMembership::Active(membership),
            None => CachedMembership::NotMember,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn sentinel_is_stored_verbatim() {
        assert_eq!(CachedMembership::NotMember.encode().unwrap(), "not_member");
        assert_eq!(
            CachedMembership::decode("not_member").unwrap(),
            CachedMembership::NotMember
        );
    }

    #[test]
    fn active_membership_survives_the_cache() {
        let membership = MembershipEntity {
            id: 9,
            club_id: 2,
            user_id: 5,
            start_date: Utc::now(),
            end_date: None,
            role: 2,
            description: "Trésorier adjoint".to_string(),
        };
        let raw = CachedMembership::Active(membership.clone()).encode().unwrap();
        assert_eq!(
            CachedMembership::decode(&raw).unwrap(),
            CachedMembership::Active(membership)
        );
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(CachedMembership::decode("{not json").is_err());
    }
}
