use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::access::{GroupRef, Identity};
use crate::cache::keys::{
    club_unix_name_key, group_id_key, group_name_key, membership_key, user_groups_key,
};
use crate::cache::{CacheStore, CachedMembership};
use crate::config::GroupSettings;
use crate::database::{AccessRepository, ClubEntity, GroupEntity, MembershipEntity};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaGroupKind {
    Board,
    Members,
}

/// 由元群组名称解析出的俱乐部短名和群组类型
#[derive(Debug, Clone, Copy)]
struct MetaGroup<'n> {
    club_unix_name: &'n str,
    kind: MetaGroupKind,
}

/// 群组成员资格判断。
///
/// 依次检查：Public 群组、特殊群组（Root、订阅者）、直属群组、俱乐部元群组。
/// 群组、直属群组列表、俱乐部以及 (俱乐部, 用户) 成员资格都会写入缓存；
/// 缓存读写失败只记录日志，随后直接查询数据库。
pub struct GroupResolver<'a, R, C> {
    repo: &'a R,
    cache: &'a C,
    settings: &'a GroupSettings,
}

impl<'a, R, C> GroupResolver<'a, R, C>
where
    R: AccessRepository,
    C: CacheStore,
{
    pub fn new(repo: &'a R, cache: &'a C, settings: &'a GroupSettings) -> Self {
        Self {
            repo,
            cache,
            settings,
        }
    }

    pub async fn is_in_group(&self, identity: &Identity, group: &GroupRef) -> Result<bool, AppError> {
        // 所有身份（包括未登录访客）都属于 Public 群组
        if self.is_public_ref(group) {
            return Ok(true);
        }

        let Identity::User(user) = identity else {
            return Ok(false);
        };

        let Some(group) = self.get_group(group).await? else {
            tracing::debug!("Unknown group {}, treating as not in group", group);
            return Ok(false);
        };

        let settings = self.settings;
        if group.id == settings.public_group_id {
            return Ok(true);
        }
        if group.id == settings.root_group_id {
            return Ok(user.is_superuser || self.has_direct_group(user.id, group.id).await?);
        }
        if group.id == settings.subscribers_group_id {
            return Ok(self.subscription_is_current(user.id).await?);
        }
        if group.id == settings.old_subscribers_group_id {
            let today = Utc::now().date_naive();
            return Ok(self.repo.subscription_state(user.id, today).await?.was_subscribed);
        }

        if self.has_direct_group(user.id, group.id).await? {
            return Ok(true);
        }

        match self.meta_group(&group) {
            Some(meta) => self.is_in_meta_group(user.id, meta).await,
            None => Ok(false),
        }
    }

    /// 未通过检查时返回适合直接响应给客户端的错误
    pub async fn require_any(&self, identity: &Identity, groups: &[GroupRef]) -> Result<(), AppError> {
        if *identity == Identity::Anonymous {
            return Err(AppError::Unauthorized);
        }
        for group in groups {
            if self.is_in_group(identity, group).await? {
                return Ok(());
            }
        }
        Err(AppError::PermissionDenied)
    }

    /// 查询用户在俱乐部中当前有效的成员资格，优先读取缓存
    pub async fn membership_for(
        &self,
        club_id: i64,
        user_id: i64,
    ) -> Result<Option<MembershipEntity>, AppError> {
        let key = membership_key(club_id, user_id);
        let now = Utc::now();

        if let Some(raw) = self.cache_get(&key).await {
            match CachedMembership::decode(&raw) {
                Ok(CachedMembership::NotMember) => return Ok(None),
                Ok(CachedMembership::Active(membership)) if membership.is_active_at(now) => {
                    return Ok(Some(membership));
                }
                Ok(CachedMembership::Active(_)) => {
                    // 缓存中的成员资格已过结束时间
                    self.cache_membership(&key, &CachedMembership::NotMember).await;
                    return Ok(None);
                }
                Err(e) => tracing::warn!("Discarding undecodable cache entry {}: {}", key, e),
            }
        }

        let membership = self.repo.active_membership(club_id, user_id, now).await?;
        self.cache_membership(&key, &CachedMembership::from(membership.clone()))
            .await;
        Ok(membership)
    }

    fn is_public_ref(&self, group: &GroupRef) -> bool {
        match group {
            GroupRef::ById(id) => *id == self.settings.public_group_id,
            GroupRef::ByName(name) => *name == self.settings.public_group_name,
        }
    }

    /// 只有标记为元群组的群组才按名称后缀映射到俱乐部
    fn meta_group<'n>(&self, group: &'n GroupEntity) -> Option<MetaGroup<'n>> {
        if !group.is_meta {
            return None;
        }
        let strip = |suffix: &str| {
            if suffix.is_empty() {
                None
            } else {
                group.name.strip_suffix(suffix)
            }
        };

        if let Some(club_unix_name) = strip(self.settings.board_suffix.as_str()) {
            return Some(MetaGroup {
                club_unix_name,
                kind: MetaGroupKind::Board,
            });
        }
        strip(self.settings.member_suffix.as_str()).map(|club_unix_name| MetaGroup {
            club_unix_name,
            kind: MetaGroupKind::Members,
        })
    }

    async fn is_in_meta_group(&self, user_id: i64, meta: MetaGroup<'_>) -> Result<bool, AppError> {
        let Some(club) = self.get_club(meta.club_unix_name).await? else {
            return Ok(false);
        };
        let Some(membership) = self.membership_for(club.id, user_id).await? else {
            return Ok(false);
        };

        Ok(match meta.kind {
            MetaGroupKind::Members => true,
            MetaGroupKind::Board => membership.role > self.settings.maximum_free_role,
        })
    }

    async fn get_group(&self, group: &GroupRef) -> Result<Option<GroupEntity>, AppError> {
        let key = match group {
            GroupRef::ById(id) => group_id_key(*id),
            GroupRef::ByName(name) => group_name_key(name),
        };
        if let Some(cached) = self.cache_get_json::<GroupEntity>(&key).await {
            return Ok(Some(cached));
        }

        let found = match group {
            GroupRef::ById(id) => self.repo.find_group_by_id(*id).await?,
            GroupRef::ByName(name) => self.repo.find_group_by_name(name).await?,
        };
        // 找不到的群组不缓存，新建群组后立即可见
        if let Some(found) = &found {
            self.cache_put_json(&group_id_key(found.id), found).await;
            self.cache_put_json(&group_name_key(&found.name), found).await;
        }
        Ok(found)
    }

    async fn get_club(&self, unix_name: &str) -> Result<Option<ClubEntity>, AppError> {
        let key = club_unix_name_key(unix_name);
        if let Some(cached) = self.cache_get_json::<ClubEntity>(&key).await {
            return Ok(Some(cached));
        }

        let found = self.repo.find_club_by_unix_name(unix_name).await?;
        if let Some(found) = &found {
            self.cache_put_json(&key, found).await;
        }
        Ok(found)
    }

    async fn has_direct_group(&self, user_id: i64, group_id: i64) -> Result<bool, AppError> {
        let key = user_groups_key(user_id);
        let group_ids = match self.cache_get_json::<Vec<i64>>(&key).await {
            Some(ids) => ids,
            None => {
                let ids = self.repo.user_group_ids(user_id).await?;
                self.cache_put_json(&key, &ids).await;
                ids
            }
        };
        Ok(group_ids.contains(&group_id))
    }

    async fn subscription_is_current(&self, user_id: i64) -> Result<bool, AppError> {
        let today = Utc::now().date_naive();
        Ok(self.repo.subscription_state(user_id, today).await?.is_subscribed)
    }

    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Cache read failed for {}, falling back to database: {}", key, e);
                None
            }
        }
    }

    async fn cache_put(&self, key: &str, value: &str) {
        if let Err(e) = self.cache.set(key, value).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }

    async fn cache_get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache_get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn cache_put_json<T: Serialize + Sync>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.cache_put(key, &raw).await,
            Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    async fn cache_membership(&self, key: &str, cached: &CachedMembership) {
        match cached.encode() {
            Ok(raw) => self.cache_put(key, &raw).await,
            Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}
