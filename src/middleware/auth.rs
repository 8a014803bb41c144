use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    AppState,
    access::Identity,
    cache::CacheStore,
    database::AccessRepository,
    error::AppError,
    utils::verify_token,
};

/// 解析请求身份并放入请求扩展。
///
/// 没有 Authorization 头的请求按未登录访客处理；令牌无效或用户不存在时返回 401。
pub async fn identify<R, C>(
    State(state): State<AppState<R, C>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    let identity = if req.headers().contains_key(AUTHORIZATION) {
        let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
            return Err(AppError::Unauthorized);
        };
        let claims = verify_token(bearer.token(), &state.config).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            AppError::Unauthorized
        })?;
        let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;
        let user = state
            .repo
            .find_user(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Identity::from(&user)
    } else {
        Identity::Anonymous
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
