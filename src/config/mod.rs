use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 群组相关配置（特殊群组ID、俱乐部元群组后缀等）
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GroupSettings {
    pub root_group_id: i64,
    pub public_group_id: i64,
    pub public_group_name: String,
    pub subscribers_group_id: i64,
    pub old_subscribers_group_id: i64,
    pub board_suffix: String,
    pub member_suffix: String,
    /// 成员可以自行选择的最高角色，超过该值即为理事会成员
    pub maximum_free_role: i32,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            root_group_id: 1,
            public_group_id: 2,
            public_group_name: "Public".to_string(),
            subscribers_group_id: 3,
            old_subscribers_group_id: 4,
            board_suffix: "-bureau".to_string(),
            member_suffix: "-membres".to_string(),
            maximum_free_role: 1,
        }
    }
}

impl GroupSettings {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root_group_id: env_or("ROOT_GROUP_ID", defaults.root_group_id),
            public_group_id: env_or("PUBLIC_GROUP_ID", defaults.public_group_id),
            public_group_name: env::var("PUBLIC_GROUP_NAME").unwrap_or(defaults.public_group_name),
            subscribers_group_id: env_or("SUBSCRIBERS_GROUP_ID", defaults.subscribers_group_id),
            old_subscribers_group_id: env_or(
                "OLD_SUBSCRIBERS_GROUP_ID",
                defaults.old_subscribers_group_id,
            ),
            board_suffix: env::var("BOARD_SUFFIX").unwrap_or(defaults.board_suffix),
            member_suffix: env::var("MEMBER_SUFFIX").unwrap_or(defaults.member_suffix),
            maximum_free_role: env_or("MAXIMUM_FREE_ROLE", defaults.maximum_free_role),
        }
    }

    /// 俱乐部理事会元群组名称
    pub fn board_group_name(&self, unix_name: &str) -> String {
        format!("{}{}", unix_name, self.board_suffix)
    }

    /// 俱乐部成员元群组名称
    pub fn members_group_name(&self, unix_name: &str) -> String {
        format!("{}{}", unix_name, self.member_suffix)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    /// 未配置时使用进程内缓存
    pub redis_url: Option<String>,
    pub cache_namespace: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub groups: GroupSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .unwrap_or_else(|_| "24h".to_string())
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            cache_namespace: env::var("CACHE_NAMESPACE").unwrap_or_else(|_| "sith:".to_string()),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "::".to_string()),
            server_port: env_or("SERVER_PORT", 3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".to_string()),
            groups: GroupSettings::from_env(),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
