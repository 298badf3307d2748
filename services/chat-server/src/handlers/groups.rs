use std::sync::Arc;

use chat_protocol::{
    command, GroupJoinAcceptRequest, GroupJoinAcceptResponse, GroupJoinReqListResponse, GroupJoinRequest,
    GroupJoinRequestSummary, GroupJoinResponse, GroupSearchRequest, GroupSearchResponse,
};

use crate::error::{AppError, AppResult};
use crate::handlers::conversations::{post_system_message, push_conv_list, push_members, require_admin};
use crate::repo;
use crate::state::{AppState, Session};
use crate::wire;

async fn admin_ids(state: &AppState, group_id: i64) -> AppResult<Vec<i64>> {
    Ok(repo::conversations::members(&state.pool, group_id)
        .await?
        .into_iter()
        .filter(|m| m.role == "OWNER" || m.role == "ADMIN")
        .map(|m| m.user_id)
        .collect())
}

async fn push_join_req_list(state: &AppState, user_id: i64) -> AppResult<()> {
    let requests = repo::groups::requests_for_admin(&state.pool, user_id)
        .await?
        .into_iter()
        .map(|r| GroupJoinRequestSummary {
            request_id: r.id,
            from_user_id: r.from_user_id,
            account: r.account,
            display_name: r.display_name,
            group_id: r.group_id,
            group_name: r.group_name,
            status: r.status,
            hello_msg: r.hello_msg,
        })
        .collect();
    wire::push_to_user(
        state,
        user_id,
        command::GROUP_JOIN_REQ_LIST_RESP,
        &GroupJoinReqListResponse { ok: true, requests },
    )
    .await;
    Ok(())
}

pub async fn handle_group_search_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: GroupSearchRequest = serde_json::from_str(payload)?;
    let group = repo::groups::find_group(&state.pool, req.group_id).await?.ok_or(AppError::NotFound)?;
    let is_member = repo::conversations::find_membership(&state.pool, req.group_id, session.user_id())
        .await?
        .is_some();

    wire::reply(
        session,
        state,
        command::GROUP_SEARCH_RESP,
        &GroupSearchResponse {
            ok: true,
            group_id: group.group_id,
            name: group.name,
            member_count: group.member_count.unwrap_or(0),
            is_member,
        },
    );
    Ok(())
}

pub async fn handle_group_join_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: GroupJoinRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    repo::groups::find_group(&state.pool, req.group_id).await?.ok_or(AppError::NotFound)?;
    if repo::conversations::find_membership(&state.pool, req.group_id, user_id).await?.is_some() {
        return Err(AppError::AlreadyMember);
    }
    if repo::groups::find_pending_join(&state.pool, user_id, req.group_id).await?.is_some() {
        return Err(AppError::AlreadyPending);
    }

    let request_id = repo::groups::create_join_request(&state.pool, user_id, req.group_id, &req.hello_msg).await?;
    wire::reply(session, state, command::GROUP_JOIN_RESP, &GroupJoinResponse { ok: true, request_id });

    for admin_id in admin_ids(state, req.group_id).await? {
        push_join_req_list(state, admin_id).await?;
    }
    Ok(())
}

pub async fn handle_group_join_req_list_req(_payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let requests = repo::groups::requests_for_admin(&state.pool, session.user_id())
        .await?
        .into_iter()
        .map(|r| GroupJoinRequestSummary {
            request_id: r.id,
            from_user_id: r.from_user_id,
            account: r.account,
            display_name: r.display_name,
            group_id: r.group_id,
            group_name: r.group_name,
            status: r.status,
            hello_msg: r.hello_msg,
        })
        .collect();
    wire::reply(session, state, command::GROUP_JOIN_REQ_LIST_RESP, &GroupJoinReqListResponse { ok: true, requests });
    Ok(())
}

pub async fn handle_group_join_accept_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: GroupJoinAcceptRequest = serde_json::from_str(payload)?;
    let actor_id = session.user_id();
    let pending = repo::groups::find_join_request(&state.pool, req.request_id)
        .await?
        .ok_or(AppError::NotFound)?;
    require_admin(state, pending.group_id, actor_id).await?;
    if pending.status != "PENDING" {
        return Err(AppError::AlreadyHandled);
    }

    let status = if req.accept { "ACCEPTED" } else { "REJECTED" };
    repo::groups::mark_handled(&state.pool, req.request_id, actor_id, status).await?;

    if req.accept {
        repo::conversations::add_member(&state.pool, pending.group_id, pending.from_user_id, "MEMBER").await?;
        state.cache.invalidate(pending.group_id).await;

        let joiner_name = repo::users::find_by_id(&state.pool, pending.from_user_id)
            .await?
            .map(|u| u.display_name)
            .unwrap_or_default();
        post_system_message(state, pending.group_id, &format!("{joiner_name} joined the group")).await?;
        push_members(state, pending.group_id).await?;
        push_conv_list(state, pending.from_user_id).await?;
    }

    wire::reply(session, state, command::GROUP_JOIN_ACCEPT_RESP, &GroupJoinAcceptResponse { ok: true });

    for admin_id in admin_ids(state, pending.group_id).await? {
        push_join_req_list(state, admin_id).await?;
    }
    Ok(())
}
