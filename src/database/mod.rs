// 数据库模块
// 包含数据库实体定义和存储库操作

use chrono::{DateTime, NaiveDate, Utc};
use std::future::Future;

pub mod models; // 数据库实体定义
pub mod repositories; // 存储库实现

pub use models::{
    ClubEntity, GroupEntity, MembershipEntity, NewMembership, SubscriptionState, UserEntity,
};
pub use repositories::access::PgAccessRepository;

pub type DbResult<T> = Result<T, sqlx::Error>;

/// 群组与成员资格查询所需的持久层接口
pub trait AccessRepository: Send + Sync {
    fn find_user(&self, user_id: i64) -> impl Future<Output = DbResult<Option<UserEntity>>> + Send;

    fn find_group_by_id(
        &self,
        group_id: i64,
    ) -> impl Future<Output = DbResult<Option<GroupEntity>>> + Send;

    fn find_group_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = DbResult<Option<GroupEntity>>> + Send;

    /// 用户直属群组ID列表
    fn user_group_ids(&self, user_id: i64) -> impl Future<Output = DbResult<Vec<i64>>> + Send;

    fn add_user_to_group(
        &self,
        user_id: i64,
        group_id: i64,
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// 返回是否确实删除了一条记录
    fn remove_user_from_group(
        &self,
        user_id: i64,
        group_id: i64,
    ) -> impl Future<Output = DbResult<bool>> + Send;

    fn find_club_by_id(
        &self,
        club_id: i64,
    ) -> impl Future<Output = DbResult<Option<ClubEntity>>> + Send;

    fn find_club_by_unix_name(
        &self,
        unix_name: &str,
    ) -> impl Future<Output = DbResult<Option<ClubEntity>>> + Send;

    /// 查询在 `now` 时刻有效的成员资格
    fn active_membership(
        &self,
        club_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> impl Future<Output = DbResult<Option<MembershipEntity>>> + Send;

    fn find_membership(
        &self,
        membership_id: i64,
    ) -> impl Future<Output = DbResult<Option<MembershipEntity>>> + Send;

    fn insert_membership(
        &self,
        membership: NewMembership,
    ) -> impl Future<Output = DbResult<MembershipEntity>> + Send;

    fn set_membership_end_date(
        &self,
        membership_id: i64,
        end_date: DateTime<Utc>,
    ) -> impl Future<Output = DbResult<Option<MembershipEntity>>> + Send;

    fn delete_membership(&self, membership_id: i64) -> impl Future<Output = DbResult<bool>> + Send;

    fn subscription_state(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> impl Future<Output = DbResult<SubscriptionState>> + Send;
}
