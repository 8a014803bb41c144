// 测试辅助
// 进程内的存储库实现，统计查询次数以验证缓存命中

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use crate::AppState;
use crate::cache::MemoryCache;
use crate::config::{Config, GroupSettings};
use crate::database::AccessRepository;
use crate::database::models::{
    ClubEntity, GroupEntity, MembershipEntity, NewMembership, SubscriptionEntity,
    SubscriptionState, UserEntity,
};

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/clubhouse_test".to_string(),
        redis_url: None,
        cache_namespace: "test:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_secs: 3600,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        api_base_uri: "/api".to_string(),
        groups: GroupSettings::default(),
    }
}

pub fn test_state(repo: MemoryRepository, cache: MemoryCache) -> AppState<MemoryRepository, MemoryCache> {
    AppState {
        config: Arc::new(test_config()),
        repo,
        cache,
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<UserEntity>,
    groups: Vec<GroupEntity>,
    user_groups: BTreeSet<(i64, i64)>,
    clubs: Vec<ClubEntity>,
    memberships: Vec<MembershipEntity>,
    subscriptions: Vec<SubscriptionEntity>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
    queries: Arc<AtomicUsize>,
}

impl MemoryRepository {
    /// 预置 Root、Public、Subscribers、Old subscribers 以及几个管理群组
    pub fn seeded() -> Self {
        let repo = Self::default();
        {
            let mut tables = repo.tables();
            for (id, name) in [
                (1, "Root"),
                (2, "Public"),
                (3, "Subscribers"),
                (4, "Old subscribers"),
                (5, "Accounting admin"),
                (6, "Communication admin"),
                (11, "SAS admin"),
            ] {
                tables.groups.push(GroupEntity {
                    id,
                    name: name.to_string(),
                    is_meta: false,
                    description: String::new(),
                });
            }
            tables.next_id = 100;
        }
        repo
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_queries(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }

    pub fn add_user(&self, username: &str, is_superuser: bool) -> UserEntity {
        let mut tables = self.tables();
        let user = UserEntity {
            id: tables.next_id(),
            username: username.to_string(),
            is_superuser,
        };
        tables.users.push(user.clone());
        user
    }

    pub fn add_group(&self, name: &str) -> GroupEntity {
        let mut tables = self.tables();
        let group = GroupEntity {
            id: tables.next_id(),
            name: name.to_string(),
            is_meta: false,
            description: String::new(),
        };
        tables.groups.push(group.clone());
        group
    }

    /// 创建俱乐部时同时生成它的理事会和成员元群组
    pub fn add_club(&self, name: &str, unix_name: &str) -> ClubEntity {
        let settings = GroupSettings::default();
        let mut tables = self.tables();
        let club = ClubEntity {
            id: tables.next_id(),
            name: name.to_string(),
            unix_name: unix_name.to_string(),
        };
        tables.clubs.push(club.clone());
        for group_name in [
            settings.board_group_name(unix_name),
            settings.members_group_name(unix_name),
        ] {
            let id = tables.next_id();
            tables.groups.push(GroupEntity {
                id,
                name: group_name,
                is_meta: true,
                description: String::new(),
            });
        }
        club
    }

    pub fn add_subscription(&self, user_id: i64, start: NaiveDate, end: NaiveDate) {
        let mut tables = self.tables();
        let id = tables.next_id();
        tables.subscriptions.push(SubscriptionEntity {
            id,
            user_id,
            subscription_start: start,
            subscription_end: end,
        });
    }

    /// 绕过服务层直接修改数据，用来模拟其他进程的写入
    pub fn raw_set_end_date(&self, membership_id: i64, end_date: Option<DateTime<Utc>>) {
        let mut tables = self.tables();
        if let Some(m) = tables.memberships.iter_mut().find(|m| m.id == membership_id) {
            m.end_date = end_date;
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    fn query(&self) -> MutexGuard<'_, Tables> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.tables()
    }
}

impl AccessRepository for MemoryRepository {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        Ok(self.query().users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_group_by_id(&self, group_id: i64) -> Result<Option<GroupEntity>, sqlx::Error> {
        Ok(self.query().groups.iter().find(|g| g.id == group_id).cloned())
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<GroupEntity>, sqlx::Error> {
        Ok(self.query().groups.iter().find(|g| g.name == name).cloned())
    }

    async fn user_group_ids(&self, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        Ok(self
            .query()
            .user_groups
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, group)| *group)
            .collect())
    }

    async fn add_user_to_group(&self, user_id: i64, group_id: i64) -> Result<(), sqlx::Error> {
        self.query().user_groups.insert((user_id, group_id));
        Ok(())
    }

    async fn remove_user_from_group(&self, user_id: i64, group_id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.query().user_groups.remove(&(user_id, group_id)))
    }

    async fn find_club_by_id(&self, club_id: i64) -> Result<Option<ClubEntity>, sqlx::Error> {
        Ok(self.query().clubs.iter().find(|c| c.id == club_id).cloned())
    }

    async fn find_club_by_unix_name(&self, unix_name: &str) -> Result<Option<ClubEntity>, sqlx::Error> {
        Ok(self
            .query()
            .clubs
            .iter()
            .find(|c| c.unix_name == unix_name)
            .cloned())
    }

    async fn active_membership(
        &self,
        club_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<MembershipEntity>, sqlx::Error> {
        Ok(self
            .query()
            .memberships
            .iter()
            .filter(|m| m.club_id == club_id && m.user_id == user_id && m.is_active_at(now))
            // 与 Postgres 实现的 ORDER BY start_date DESC 保持一致
            .max_by_key(|m| m.start_date)
            .cloned())
    }

    async fn find_membership(&self, membership_id: i64) -> Result<Option<MembershipEntity>, sqlx::Error> {
        Ok(self
            .query()
            .memberships
            .iter()
            .find(|m| m.id == membership_id)
            .cloned())
    }

    async fn insert_membership(&self, membership: NewMembership) -> Result<MembershipEntity, sqlx::Error> {
        let mut tables = self.query();
        let entity = MembershipEntity {
            id: tables.next_id(),
            club_id: membership.club_id,
            user_id: membership.user_id,
            start_date: membership.start_date,
            end_date: None,
            role: membership.role,
            description: membership.description,
        };
        tables.memberships.push(entity.clone());
        Ok(entity)
    }

    async fn set_membership_end_date(
        &self,
        membership_id: i64,
        end_date: DateTime<Utc>,
    ) -> Result<Option<MembershipEntity>, sqlx::Error> {
        let mut tables = self.query();
        Ok(tables
            .memberships
            .iter_mut()
            .find(|m| m.id == membership_id)
            .map(|m| {
                m.end_date = Some(end_date);
                m.clone()
            }))
    }

    async fn delete_membership(&self, membership_id: i64) -> Result<bool, sqlx::Error> {
        let mut tables = self.query();
        let before = tables.memberships.len();
        tables.memberships.retain(|m| m.id != membership_id);
        Ok(tables.memberships.len() != before)
    }

    async fn subscription_state(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<SubscriptionState, sqlx::Error> {
        let tables = self.query();
        let mut state = SubscriptionState::default();
        for sub in tables.subscriptions.iter().filter(|s| s.user_id == user_id) {
            state.was_subscribed = true;
            state.is_subscribed |= sub.covers(today);
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn latest_active_membership_wins() {
        let repo = MemoryRepository::seeded();
        let club = repo.add_club("AE", "ae");
        let user = repo.add_user("toto", false);
        let now = Utc::now();

        let newer = repo
            .insert_membership(NewMembership {
                club_id: club.id,
                user_id: user.id,
                role: 1,
                description: String::new(),
                start_date: now - Duration::days(1),
            })
            .await
            .unwrap();
        repo.insert_membership(NewMembership {
            club_id: club.id,
            user_id: user.id,
            role: 7,
            description: String::new(),
            start_date: now - Duration::days(30),
        })
        .await
        .unwrap();

        let active = repo.active_membership(club.id, user.id, now).await.unwrap();
        assert_eq!(active.map(|m| m.id), Some(newer.id));
    }
}
