// 数据库实体
// 定义用户、群组、俱乐部、成员资格相关的表结构

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户实体，对应 users 表
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    /// 超级用户自动属于 Root 群组
    pub is_superuser: bool,
}

/// 群组实体，对应 groups 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GroupEntity {
    pub id: i64,
    pub name: String,
    /// 是否为俱乐部自动生成的元群组
    pub is_meta: bool,
    pub description: String,
}

/// 俱乐部实体，对应 clubs 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClubEntity {
    pub id: i64,
    pub name: String,
    /// 俱乐部短名，用于生成元群组名称
    pub unix_name: String,
}

/// 成员资格实体，对应 memberships 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MembershipEntity {
    pub id: i64,
    pub club_id: i64,
    pub user_id: i64,
    pub start_date: DateTime<Utc>,
    /// 为空表示仍然有效
    pub end_date: Option<DateTime<Utc>>,
    /// 俱乐部角色：0-好奇者，1-活跃成员，2及以上为理事会
    pub role: i32,
    pub description: String,
}

impl MembershipEntity {
    /// 结束时间为空或在未来即为有效
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_none_or(|end| end > now)
    }
}

/// 新建成员资格所需的字段
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub club_id: i64,
    pub user_id: i64,
    pub role: i32,
    pub description: String,
    pub start_date: DateTime<Utc>,
}

/// 用户的会员订阅状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct SubscriptionState {
    /// 当前日期处于某个订阅区间内
    pub is_subscribed: bool,
    /// 曾经有过订阅
    pub was_subscribed: bool,
}

/// 订阅实体，对应 subscriptions 表
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionEntity {
    pub id: i64,
    pub user_id: i64,
    pub subscription_start: NaiveDate,
    pub subscription_end: NaiveDate,
}

impl SubscriptionEntity {
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.subscription_start <= day && day <= self.subscription_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn membership(end_date: Option<DateTime<Utc>>) -> MembershipEntity {
        MembershipEntity {
            id: 1,
            club_id: 1,
            user_id: 1,
            start_date: Utc::now() - Duration::days(30),
            end_date,
            role: 1,
            description: String::new(),
        }
    }

    #[test]
    fn open_membership_is_active() {
        assert!(membership(None).is_active_at(Utc::now()));
    }

    #[test]
    fn ended_membership_is_inactive() {
        let now = Utc::now();
        assert!(!membership(Some(now - Duration::minutes(5))).is_active_at(now));
        assert!(membership(Some(now + Duration::days(1))).is_active_at(now));
    }

    #[test]
    fn subscription_bounds_are_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let sub = SubscriptionEntity {
            id: 1,
            user_id: 1,
            subscription_start: start,
            subscription_end: end,
        };
        assert!(sub.covers(start));
        assert!(sub.covers(end));
        assert!(!sub.covers(end + Duration::days(1)));
    }
}
