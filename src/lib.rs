use std::sync::Arc;

use access::{GroupResolver, MembershipService};
use cache::{AppCache, CacheStore};
use config::Config;
use database::{AccessRepository, PgAccessRepository};

pub mod access;
pub mod cache;
pub mod common;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod utils;

#[cfg(test)]
mod testing;

#[derive(Clone)]
pub struct AppState<R = PgAccessRepository, C = AppCache> {
    pub config: Arc<Config>,
    pub repo: R,
    pub cache: C,
}

impl<R, C> AppState<R, C>
where
    R: AccessRepository,
    C: CacheStore,
{
    /// 当前请求使用的群组判断器
    pub fn resolver(&self) -> GroupResolver<'_, R, C> {
        GroupResolver::new(&self.repo, &self.cache, &self.config.groups)
    }

    pub fn memberships(&self) -> MembershipService<'_, R, C> {
        MembershipService::new(&self.repo, &self.cache)
    }
}
