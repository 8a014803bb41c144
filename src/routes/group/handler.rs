use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    access::{GroupRef, Identity},
    cache::CacheStore,
    common::EmptyResponse,
    database::AccessRepository,
    error::AppError,
    utils::success_to_api_response,
};

use super::model::{AddGroupUserRequest, CheckQuery, CheckResponse, RemoveGroupUserResponse};

pub async fn check_membership<R, C>(
    State(state): State<AppState<R, C>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CheckQuery>,
) -> Response
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    let group = match GroupRef::from_parts(query.pk, query.name) {
        Ok(group) => group,
        Err(e) => return e.into_response(),
    };

    match state.resolver().is_in_group(&identity, &group).await {
        Ok(in_group) => (
            StatusCode::OK,
            success_to_api_response(CheckResponse { in_group }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn add_user<R, C>(
    State(state): State<AppState<R, C>>,
    Extension(identity): Extension<Identity>,
    Path(group_id): Path<i64>,
    Json(req): Json<AddGroupUserRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    require_root(&state, &identity).await?;
    state
        .memberships()
        .add_user_to_group(req.user_id, group_id)
        .await?;

    Ok((StatusCode::OK, success_to_api_response(EmptyResponse {})))
}

pub async fn remove_user<R, C>(
    State(state): State<AppState<R, C>>,
    Extension(identity): Extension<Identity>,
    Path((group_id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError>
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    require_root(&state, &identity).await?;
    let removed = state
        .memberships()
        .remove_user_from_group(user_id, group_id)
        .await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(RemoveGroupUserResponse { removed }),
    ))
}

async fn require_root<R, C>(state: &AppState<R, C>, identity: &Identity) -> Result<(), AppError>
where
    R: AccessRepository,
    C: CacheStore,
{
    let root = GroupRef::ById(state.config.groups.root_group_id);
    state.resolver().require_any(identity, &[root]).await
}
