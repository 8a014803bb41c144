use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    AppState,
    access::{GroupRef, Identity},
    cache::CacheStore,
    database::{AccessRepository, ClubEntity, NewMembership},
    error::AppError,
    utils::success_to_api_response,
};

use super::model::{CreateMembershipRequest, EndMembershipRequest, MembershipInfo};

/// 加入俱乐部。用户可以自行加入并选择不高于 maximum_free_role 的角色，
/// 其余情况需要 Root 或该俱乐部理事会权限。
pub async fn create_membership<R, C>(
    State(state): State<AppState<R, C>>,
    Extension(identity): Extension<Identity>,
    Path(club_id): Path<i64>,
    Json(req): Json<CreateMembershipRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    let club = find_club(&state, club_id).await?;
    let self_service = identity.user_id() == Some(req.user_id)
        && req.role <= state.config.groups.maximum_free_role;
    if !self_service {
        require_club_manager(&state, &identity, &club).await?;
    }

    let membership = state
        .memberships()
        .create_membership(NewMembership {
            club_id: club.id,
            user_id: req.user_id,
            role: req.role,
            description: req.description,
            start_date: Utc::now(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        success_to_api_response(MembershipInfo::from(membership)),
    ))
}

/// 结束成员资格。成员本人可以立即退出或补记过去的结束时间，
/// 设置未来的结束时间需要管理权限
pub async fn end_membership<R, C>(
    State(state): State<AppState<R, C>>,
    Extension(identity): Extension<Identity>,
    Path(membership_id): Path<i64>,
    Json(req): Json<EndMembershipRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    let membership = state
        .repo
        .find_membership(membership_id)
        .await?
        .ok_or(AppError::NotFound("membership"))?;
    let end_date = req.end_date.unwrap_or_else(Utc::now);
    let self_service = identity.user_id() == Some(membership.user_id) && end_date <= Utc::now();
    if !self_service {
        let club = find_club(&state, membership.club_id).await?;
        require_club_manager(&state, &identity, &club).await?;
    }

    let updated = state
        .memberships()
        .end_membership(membership_id, end_date)
        .await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(MembershipInfo::from(updated)),
    ))
}

pub async fn delete_membership<R, C>(
    State(state): State<AppState<R, C>>,
    Extension(identity): Extension<Identity>,
    Path(membership_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    R: AccessRepository + Clone + 'static,
    C: CacheStore + Clone + 'static,
{
    let membership = state
        .repo
        .find_membership(membership_id)
        .await?
        .ok_or(AppError::NotFound("membership"))?;
    let club = find_club(&state, membership.club_id).await?;
    require_club_manager(&state, &identity, &club).await?;

    let deleted = state.memberships().delete_membership(membership_id).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(MembershipInfo::from(deleted)),
    ))
}

async fn find_club<R, C>(state: &AppState<R, C>, club_id: i64) -> Result<ClubEntity, AppError>
where
    R: AccessRepository,
    C: CacheStore,
{
    state
        .repo
        .find_club_by_id(club_id)
        .await?
        .ok_or(AppError::NotFound("club"))
}

async fn require_club_manager<R, C>(
    state: &AppState<R, C>,
    identity: &Identity,
    club: &ClubEntity,
) -> Result<(), AppError>
where
    R: AccessRepository,
    C: CacheStore,
{
    let groups = &state.config.groups;
    let allowed = [
        GroupRef::ById(groups.root_group_id),
        GroupRef::ByName(groups.board_group_name(&club.unix_name)),
    ];
    state.resolver().require_any(identity, &allowed).await
}
