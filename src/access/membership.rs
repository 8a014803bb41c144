use chrono::{DateTime, Utc};

use crate::access::ClubRole;
use crate::cache::keys::{membership_key, user_groups_key};
use crate::cache::{CacheStore, CachedMembership};
use crate::database::{AccessRepository, MembershipEntity, NewMembership};
use crate::error::AppError;

/// 成员资格与群组分配的写操作。
///
/// 每个写操作在数据库提交后同步更新对应的缓存项，调用方无需再手动失效缓存。
pub struct MembershipService<'a, R, C> {
    repo: &'a R,
    cache: &'a C,
}

impl<'a, R, C> MembershipService<'a, R, C>
where
    R: AccessRepository,
    C: CacheStore,
{
    pub fn new(repo: &'a R, cache: &'a C) -> Self {
        Self { repo, cache }
    }

    /// 新建成员资格。同一用户在同一俱乐部已有有效成员资格时返回冲突错误
    pub async fn create_membership(
        &self,
        membership: NewMembership,
    ) -> Result<MembershipEntity, AppError> {
        if ClubRole::from_id(membership.role).is_none() {
            return Err(AppError::InvalidArgument(format!(
                "unknown club role {}",
                membership.role
            )));
        }
        if self.repo.find_club_by_id(membership.club_id).await?.is_none() {
            return Err(AppError::NotFound("club"));
        }
        if self.repo.find_user(membership.user_id).await?.is_none() {
            return Err(AppError::NotFound("user"));
        }

        let now = Utc::now();
        if self
            .repo
            .active_membership(membership.club_id, membership.user_id, now)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "user {} is already a member of club {}",
                membership.user_id, membership.club_id
            )));
        }

        let (club_id, user_id) = (membership.club_id, membership.user_id);
        let created = match self.repo.insert_membership(membership).await {
            Ok(created) => created,
            // 并发创建时由唯一索引兜底
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::Conflict(format!(
                    "user {} is already a member of club {}",
                    user_id, club_id
                )));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            "User {} joined club {} with role {}",
            created.user_id,
            created.club_id,
            created.role
        );

        self.store(&created, CachedMembership::Active(created.clone()))
            .await;
        Ok(created)
    }

    /// 设置成员资格的结束时间，然后按数据库中的最新状态刷新缓存。
    ///
    /// 只能结束当前有效的成员资格，已结束的记录不能再改动结束时间，
    /// 否则旧记录可能与新记录同时生效。
    pub async fn end_membership(
        &self,
        membership_id: i64,
        end_date: DateTime<Utc>,
    ) -> Result<MembershipEntity, AppError> {
        let current = self
            .repo
            .find_membership(membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        if !current.is_active_at(Utc::now()) {
            return Err(AppError::Conflict(format!(
                "membership {} has already ended",
                membership_id
            )));
        }
        if end_date < current.start_date {
            return Err(AppError::InvalidArgument(format!(
                "end date {} is before start date {}",
                end_date, current.start_date
            )));
        }

        let updated = self
            .repo
            .set_membership_end_date(membership_id, end_date)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        tracing::info!(
            "Membership {} of user {} in club {} ends at {}",
            updated.id,
            updated.user_id,
            updated.club_id,
            end_date
        );

        // 同一俱乐部可能还有另一条有效记录，不能直接写入 "不是成员"
        let active = self
            .repo
            .active_membership(updated.club_id, updated.user_id, Utc::now())
            .await?;
        self.store(&updated, CachedMembership::from(active)).await;
        Ok(updated)
    }

    /// 删除成员资格并移除对应的缓存项
    pub async fn delete_membership(&self, membership_id: i64) -> Result<MembershipEntity, AppError> {
        let membership = self
            .repo
            .find_membership(membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        if !self.repo.delete_membership(membership_id).await? {
            return Err(AppError::NotFound("membership"));
        }
        tracing::info!(
            "Deleted membership {} of user {} in club {}",
            membership.id,
            membership.user_id,
            membership.club_id
        );

        self.invalidate(&membership_key(membership.club_id, membership.user_id))
            .await;
        Ok(membership)
    }

    pub async fn add_user_to_group(&self, user_id: i64, group_id: i64) -> Result<(), AppError> {
        if self.repo.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("user"));
        }
        if self.repo.find_group_by_id(group_id).await?.is_none() {
            return Err(AppError::NotFound("group"));
        }

        self.repo.add_user_to_group(user_id, group_id).await?;
        tracing::info!("Added user {} to group {}", user_id, group_id);
        self.invalidate(&user_groups_key(user_id)).await;
        Ok(())
    }

    /// 返回用户原本是否在该群组中
    pub async fn remove_user_from_group(&self, user_id: i64, group_id: i64) -> Result<bool, AppError> {
        let removed = self.repo.remove_user_from_group(user_id, group_id).await?;
        if removed {
            tracing::info!("Removed user {} from group {}", user_id, group_id);
        }
        self.invalidate(&user_groups_key(user_id)).await;
        Ok(removed)
    }

    /// 手动清除 (俱乐部, 用户) 的成员资格缓存，缓存错误直接返回给调用方
    pub async fn clear_membership_cache(&self, club_id: i64, user_id: i64) -> Result<(), AppError> {
        self.cache.delete(&membership_key(club_id, user_id)).await?;
        Ok(())
    }

    async fn store(&self, membership: &MembershipEntity, cached: CachedMembership) {
        let key = membership_key(membership.club_id, membership.user_id);
        let raw = match cached.encode() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Failed to serialize membership {}: {}", membership.id, e);
                self.invalidate(&key).await;
                return;
            }
        };
        if let Err(e) = self.cache.set(&key, &raw).await {
            tracing::error!("Failed to refresh cache entry {}, it may be stale: {}", key, e);
        }
    }

    async fn invalidate(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            tracing::error!("Failed to invalidate cache entry {}, it may be stale: {}", key, e);
        }
    }
}
