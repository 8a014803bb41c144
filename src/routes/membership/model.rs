use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::ClubRole;
use crate::database::MembershipEntity;

#[derive(Debug, Deserialize)]
pub struct CreateMembershipRequest {
    pub user_id: i64,
    /// 缺省为 0（好奇者）
    #[serde(default)]
    pub role: i32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndMembershipRequest {
    /// 缺省为当前时间
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipInfo {
    pub id: i64,
    pub club_id: i64,
    pub user_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub role: i32,
    pub role_name: Option<String>,
    pub description: String,
    pub is_active: bool,
}

impl From<MembershipEntity> for MembershipInfo {
    fn from(membership: MembershipEntity) -> Self {
        Self {
            is_active: membership.is_active_at(Utc::now()),
            role_name: ClubRole::from_id(membership.role).map(|role| role.label().to_string()),
            id: membership.id,
            club_id: membership.club_id,
            user_id: membership.user_id,
            start_date: membership.start_date,
            end_date: membership.end_date,
            role: membership.role,
            description: membership.description,
        }
    }
}
