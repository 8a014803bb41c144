use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    cache::CacheStore,
    database::AccessRepository,
    middleware::{identify, log_errors},
};

pub mod group;
pub mod membership;

/// 组装全部 API 路由，挂载在 `config.api_base_uri` 下
pub fn router<R, C>(state: AppState<R, C>) -> Router
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    let api = Router::new()
        // 群组路由
        .route("/groups/check", get(group::check_membership::<R, C>))
        .route("/groups/{group_id}/users", post(group::add_user::<R, C>))
        .route(
            "/groups/{group_id}/users/{user_id}",
            delete(group::remove_user::<R, C>),
        )
        // 成员资格路由
        .route(
            "/clubs/{club_id}/memberships",
            post(membership::create_membership::<R, C>),
        )
        .route(
            "/memberships/{membership_id}/end",
            put(membership::end_membership::<R, C>),
        )
        .route(
            "/memberships/{membership_id}",
            delete(membership::delete_membership::<R, C>),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identify::<R, C>,
        ));

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(base, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
