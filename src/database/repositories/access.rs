// 群组与成员资格存储库
// 包含权限判断所需的全部数据库操作

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Error as SqlxError, PgPool};

use crate::database::AccessRepository;
use crate::database::models::{
    ClubEntity, GroupEntity, MembershipEntity, NewMembership, SubscriptionState, UserEntity,
};

const MEMBERSHIP_COLUMNS: &str =
    "id, club_id, user_id, start_date, end_date, role, description";

/// 群组存储库，处理所有与群组、俱乐部成员资格相关的数据库操作
#[derive(Clone)]
pub struct PgAccessRepository {
    db: PgPool,
}

impl PgAccessRepository {
    /// 创建新的存储库实例
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl AccessRepository for PgAccessRepository {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserEntity>, SqlxError> {
        sqlx::query_as::<_, UserEntity>(
            "SELECT id, username, is_superuser FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_group_by_id(&self, group_id: i64) -> Result<Option<GroupEntity>, SqlxError> {
        sqlx::query_as::<_, GroupEntity>(
            "SELECT id, name, is_meta, description FROM groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<GroupEntity>, SqlxError> {
        sqlx::query_as::<_, GroupEntity>(
            "SELECT id, name, is_meta, description FROM groups WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await
    }

    async fn user_group_ids(&self, user_id: i64) -> Result<Vec<i64>, SqlxError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT group_id FROM user_groups WHERE user_id = $1 ORDER BY group_id",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    async fn add_user_to_group(&self, user_id: i64, group_id: i64) -> Result<(), SqlxError> {
        // 已在群组中则什么都不做
        sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, group_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn remove_user_from_group(&self, user_id: i64, group_id: i64) -> Result<bool, SqlxError> {
        let result = sqlx::query("DELETE FROM user_groups WHERE user_id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_club_by_id(&self, club_id: i64) -> Result<Option<ClubEntity>, SqlxError> {
        sqlx::query_as::<_, ClubEntity>("SELECT id, name, unix_name FROM clubs WHERE id = $1")
            .bind(club_id)
            .fetch_optional(&self.db)
            .await
    }

    async fn find_club_by_unix_name(&self, unix_name: &str) -> Result<Option<ClubEntity>, SqlxError> {
        sqlx::query_as::<_, ClubEntity>(
            "SELECT id, name, unix_name FROM clubs WHERE unix_name = $1",
        )
        .bind(unix_name)
        .fetch_optional(&self.db)
        .await
    }

    async fn active_membership(
        &self,
        club_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<MembershipEntity>, SqlxError> {
        let sql = format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM memberships
            WHERE club_id = $1 AND user_id = $2
              AND (end_date IS NULL OR end_date > $3)
            ORDER BY start_date DESC
            LIMIT 1
            "#
        );
        sqlx::query_as::<_, MembershipEntity>(&sql)
            .bind(club_id)
            .bind(user_id)
            .bind(now)
            .fetch_optional(&self.db)
            .await
    }

    async fn find_membership(&self, membership_id: i64) -> Result<Option<MembershipEntity>, SqlxError> {
        let sql = format!("SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE id = $1");
        sqlx::query_as::<_, MembershipEntity>(&sql)
            .bind(membership_id)
            .fetch_optional(&self.db)
            .await
    }

    async fn insert_membership(&self, membership: NewMembership) -> Result<MembershipEntity, SqlxError> {
        let sql = format!(
            r#"
            INSERT INTO memberships (club_id, user_id, start_date, end_date, role, description)
            VALUES ($1, $2, $3, NULL, $4, $5)
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        );
        sqlx::query_as::<_, MembershipEntity>(&sql)
            .bind(membership.club_id)
            .bind(membership.user_id)
            .bind(membership.start_date)
            .bind(membership.role)
            .bind(membership.description)
            .fetch_one(&self.db)
            .await
    }

    async fn set_membership_end_date(
        &self,
        membership_id: i64,
        end_date: DateTime<Utc>,
    ) -> Result<Option<MembershipEntity>, SqlxError> {
        let sql = format!(
            "UPDATE memberships SET end_date = $2 WHERE id = $1 RETURNING {MEMBERSHIP_COLUMNS}"
        );
        sqlx::query_as::<_, MembershipEntity>(&sql)
            .bind(membership_id)
            .bind(end_date)
            .fetch_optional(&self.db)
            .await
    }

    async fn delete_membership(&self, membership_id: i64) -> Result<bool, SqlxError> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = $1")
            .bind(membership_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn subscription_state(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<SubscriptionState, SqlxError> {
        sqlx::query_as::<_, SubscriptionState>(
            r#"
            SELECT
                COALESCE(BOOL_OR(subscription_start <= $2 AND subscription_end >= $2), FALSE)
                    AS is_subscribed,
                COUNT(*) > 0 AS was_subscribed
            FROM subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(&self.db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a Postgres server"]
    async fn clubs_get_meta_groups(pool: PgPool) -> sqlx::Result<()> {
        let repo = PgAccessRepository::new(pool.clone());
        sqlx::query("INSERT INTO clubs (name, unix_name) VALUES ('AE', 'ae')")
            .execute(&pool)
            .await?;

        for name in ["ae-bureau", "ae-membres"] {
            let group = repo.find_group_by_name(name).await?;
            assert!(group.is_some_and(|g| g.is_meta), "{name}");
        }

        sqlx::query("UPDATE clubs SET unix_name = 'bde' WHERE unix_name = 'ae'")
            .execute(&pool)
            .await?;
        assert!(repo.find_group_by_name("ae-membres").await?.is_none());
        assert!(repo.find_group_by_name("bde-membres").await?.is_some_and(|g| g.is_meta));
        Ok(())
    }
}
