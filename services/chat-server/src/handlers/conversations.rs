use std::collections::HashMap;
use std::sync::Arc;

use chat_protocol::{
    command, Ack, ConvListResponse, ConvMembersRequest, ConvMembersResponse, ConvSummary, CreateGroupRequest,
    CreateGroupResponse, LeaveConvRequest, LeaveConvResponse, MemberSummary as WireMemberSummary, MsgPush,
    MuteMemberRequest, OpenSingleConvRequest, OpenSingleConvResponse, SetAdminRequest, UnmuteMemberRequest,
};

use crate::error::{AppError, AppResult};
use crate::handlers::now_ms;
use crate::repo;
use crate::repo::conversations::MemberRow;
use crate::state::{AppState, Session};
use crate::wire;

/// Persists a SYSTEM message (`senderId=0`, no membership/mute checks apply)
/// and broadcasts it to the conversation, matching the ack-then-push shape
/// every mutating conversation handler follows (spec §4.7).
pub(crate) async fn post_system_message(state: &AppState, conversation_id: i64, content: &str) -> AppResult<()> {
    let stored = repo::messages::allocate_and_insert(&state.pool, conversation_id, 0, "SYSTEM", content, now_ms()).await?;
    let push = MsgPush {
        conversation_id,
        conversation_type: "GROUP".to_owned(),
        server_msg_id: stored.id,
        sender_id: 0,
        sender_display_name: String::new(),
        msg_type: "SYSTEM".to_owned(),
        server_time_ms: stored.server_time_ms,
        seq: stored.seq,
        content: content.to_owned(),
    };
    wire::broadcast_conversation(state, conversation_id, command::MSG_PUSH, &push).await;
    Ok(())
}

async fn display_names(state: &AppState, user_ids: impl Iterator<Item = i64>) -> AppResult<HashMap<i64, String>> {
    let mut names = HashMap::new();
    for user_id in user_ids {
        if names.contains_key(&user_id) {
            continue;
        }
        let name = repo::users::find_by_id(&state.pool, user_id)
            .await?
            .map(|u| u.display_name)
            .unwrap_or_default();
        names.insert(user_id, name);
    }
    Ok(names)
}

async fn member_summaries(state: &AppState, conversation_id: i64) -> AppResult<Vec<MemberRow>> {
    if let Some(cached) = state.cache.members(conversation_id).await {
        return Ok(cached
            .into_iter()
            .map(|m| MemberRow {
                conversation_id,
                user_id: m.user_id,
                role: m.role,
                muted_until_ms: m.muted_until_ms,
            })
            .collect());
    }
    let rows = repo::conversations::members(&state.pool, conversation_id).await?;
    let names = display_names(state, rows.iter().map(|r| r.user_id)).await?;
    state.cache.populate_members(conversation_id, &rows, &names).await;
    Ok(rows)
}

pub(crate) async fn build_conv_list(state: &AppState, user_id: i64) -> AppResult<Vec<ConvSummary>> {
    let convs = repo::conversations::conversations_for_user(&state.pool, user_id).await?;
    let mut summaries = Vec::with_capacity(convs.len());
    for conv in convs {
        let title = if conv.conv_type == "SINGLE" {
            let members = repo::conversations::members(&state.pool, conv.conversation_id).await?;
            let peer_id = members.iter().map(|m| m.user_id).find(|id| *id != user_id);
            match peer_id {
                Some(id) => repo::users::find_by_id(&state.pool, id)
                    .await?
                    .map(|u| u.display_name)
                    .unwrap_or_default(),
                None => conv.name.clone(),
            }
        } else {
            conv.name.clone()
        };
        let (last_seq, last_server_time_ms) = repo::conversations::last_message_marker(&state.pool, conv.conversation_id).await?;
        summaries.push(ConvSummary {
            conversation_id: conv.conversation_id,
            conversation_type: conv.conv_type,
            title,
            last_seq,
            last_server_time_ms,
        });
    }
    Ok(summaries)
}

pub(crate) async fn push_conv_list(state: &AppState, user_id: i64) -> AppResult<()> {
    let conversations = build_conv_list(state, user_id).await?;
    wire::push_to_user(
        state,
        user_id,
        command::CONV_LIST_RESP,
        &ConvListResponse { ok: true, conversations },
    )
    .await;
    Ok(())
}

pub(crate) async fn push_members(state: &AppState, conversation_id: i64) -> AppResult<()> {
    state.cache.invalidate(conversation_id).await;
    let rows = member_summaries(state, conversation_id).await?;
    let names = display_names(state, rows.iter().map(|r| r.user_id)).await?;
    let members = rows
        .into_iter()
        .map(|r| WireMemberSummary {
            user_id: r.user_id,
            display_name: names.get(&r.user_id).cloned().unwrap_or_default(),
            role: r.role,
            muted_until_ms: r.muted_until_ms,
        })
        .collect();
    wire::broadcast_conversation(
        state,
        conversation_id,
        command::CONV_MEMBERS_RESP,
        &ConvMembersResponse {
            ok: true,
            conversation_id,
            members,
        },
    )
    .await;
    Ok(())
}

/// Actor must be a member with role OWNER or ADMIN; returns that role.
pub(crate) async fn require_admin(state: &AppState, conversation_id: i64, actor_id: i64) -> AppResult<String> {
    let membership = repo::conversations::find_membership(&state.pool, conversation_id, actor_id)
        .await?
        .ok_or(AppError::NotMember)?;
    if membership.role != "OWNER" && membership.role != "ADMIN" {
        return Err(AppError::PermissionDenied);
    }
    Ok(membership.role)
}

pub async fn handle_conv_list_req(_payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let conversations = build_conv_list(state, session.user_id()).await?;
    wire::reply(
        session,
        state,
        command::CONV_LIST_RESP,
        &ConvListResponse { ok: true, conversations },
    );
    Ok(())
}

pub async fn handle_conv_members_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: ConvMembersRequest = serde_json::from_str(payload)?;
    let actor_id = session.user_id();
    repo::conversations::find_membership(&state.pool, req.conversation_id, actor_id)
        .await?
        .ok_or(AppError::NotMember)?;

    let rows = member_summaries(state, req.conversation_id).await?;
    let names = display_names(state, rows.iter().map(|r| r.user_id)).await?;
    let members = rows
        .into_iter()
        .map(|r| WireMemberSummary {
            user_id: r.user_id,
            display_name: names.get(&r.user_id).cloned().unwrap_or_default(),
            role: r.role,
            muted_until_ms: r.muted_until_ms,
        })
        .collect();

    wire::reply(
        session,
        state,
        command::CONV_MEMBERS_RESP,
        &ConvMembersResponse {
            ok: true,
            conversation_id: req.conversation_id,
            members,
        },
    );
    Ok(())
}

pub async fn handle_mute_member_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: MuteMemberRequest = serde_json::from_str(payload)?;
    if req.duration_seconds <= 0 {
        return Err(AppError::InvalidParam("durationSeconds must be positive".into()));
    }
    let actor_id = session.user_id();
    require_admin(state, req.conversation_id, actor_id).await?;

    let target = repo::conversations::find_membership(&state.pool, req.conversation_id, req.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if target.role == "OWNER" {
        return Err(AppError::Forbidden);
    }

    let muted_until_ms = now_ms() + req.duration_seconds * 1000;
    repo::conversations::set_muted_until(&state.pool, req.conversation_id, req.user_id, muted_until_ms).await?;

    let actor_name = session.display_name().await;
    post_system_message(
        state,
        req.conversation_id,
        &format!("{actor_name} muted a member for {}s", req.duration_seconds),
    )
    .await?;
    push_members(state, req.conversation_id).await?;

    wire::reply(session, state, command::MUTE_MEMBER_RESP, &Ack::ok());
    Ok(())
}

pub async fn handle_unmute_member_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: UnmuteMemberRequest = serde_json::from_str(payload)?;
    let actor_id = session.user_id();
    require_admin(state, req.conversation_id, actor_id).await?;

    repo::conversations::find_membership(&state.pool, req.conversation_id, req.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    repo::conversations::set_muted_until(&state.pool, req.conversation_id, req.user_id, 0).await?;
    push_members(state, req.conversation_id).await?;

    wire::reply(session, state, command::UNMUTE_MEMBER_RESP, &Ack::ok());
    Ok(())
}

/// Role changes are owner-gated only: unlike mute/unmute, admins cannot
/// promote or demote other members.
pub async fn handle_set_admin_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: SetAdminRequest = serde_json::from_str(payload)?;
    let actor_id = session.user_id();
    let actor_membership = repo::conversations::find_membership(&state.pool, req.conversation_id, actor_id)
        .await?
        .ok_or(AppError::NotMember)?;
    if actor_membership.role != "OWNER" {
        return Err(AppError::PermissionDenied);
    }

    let target = repo::conversations::find_membership(&state.pool, req.conversation_id, req.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if target.role == "OWNER" {
        return Err(AppError::Forbidden);
    }

    let new_role = if req.is_admin { "ADMIN" } else { "MEMBER" };
    repo::conversations::set_role(&state.pool, req.conversation_id, req.user_id, new_role).await?;

    let actor_name = session.display_name().await;
    let verb = if req.is_admin { "promoted" } else { "demoted" };
    post_system_message(state, req.conversation_id, &format!("{actor_name} {verb} a member")).await?;
    push_members(state, req.conversation_id).await?;

    wire::reply(session, state, command::SET_ADMIN_RESP, &Ack::ok());
    Ok(())
}

pub async fn handle_leave_conv_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: LeaveConvRequest = serde_json::from_str(payload)?;
    if req.conversation_id == state.world_conversation_id {
        return Err(AppError::Forbidden);
    }
    let actor_id = session.user_id();
    let membership = repo::conversations::find_membership(&state.pool, req.conversation_id, actor_id)
        .await?
        .ok_or(AppError::NotMember)?;

    let member_count = repo::conversations::member_count(&state.pool, req.conversation_id).await?;
    let dissolved = membership.role == "OWNER" || member_count <= 2;

    if dissolved {
        let member_ids = repo::conversations::member_ids(&state.pool, req.conversation_id).await?;
        let actor_name = session.display_name().await;
        post_system_message(
            state,
            req.conversation_id,
            &format!("{actor_name} dissolved the group"),
        )
        .await?;
        repo::conversations::dissolve(&state.pool, req.conversation_id).await?;
        state.cache.invalidate(req.conversation_id).await;
        for member_id in member_ids {
            push_conv_list(state, member_id).await?;
        }
    } else {
        let actor_name = session.display_name().await;
        post_system_message(state, req.conversation_id, &format!("{actor_name} left the group")).await?;
        repo::conversations::remove_member(&state.pool, req.conversation_id, actor_id).await?;
        push_members(state, req.conversation_id).await?;
        push_conv_list(state, actor_id).await?;
    }

    wire::reply(
        session,
        state,
        command::LEAVE_CONV_RESP,
        &LeaveConvResponse { ok: true, dissolved },
    );
    Ok(())
}

pub async fn handle_open_single_conv_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: OpenSingleConvRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    if req.peer_user_id == user_id {
        return Err(AppError::InvalidParam("cannot open a conversation with yourself".into()));
    }
    if !repo::friends::are_friends(&state.pool, user_id, req.peer_user_id).await? {
        return Err(AppError::NotFriend);
    }

    let conversation_id = match repo::conversations::find_single_between(&state.pool, user_id, req.peer_user_id).await? {
        Some(id) => id,
        None => {
            let id = repo::conversations::create_single(&state.pool, user_id, req.peer_user_id).await?;
            state.cache.invalidate(id).await;
            id
        }
    };

    wire::reply(
        session,
        state,
        command::OPEN_SINGLE_CONV_RESP,
        &OpenSingleConvResponse { ok: true, conversation_id },
    );
    push_conv_list(state, user_id).await?;
    push_conv_list(state, req.peer_user_id).await?;
    Ok(())
}

pub async fn handle_create_group_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: CreateGroupRequest = serde_json::from_str(payload)?;
    let owner_id = session.user_id();

    let mut member_ids: Vec<i64> = Vec::new();
    for raw in &req.member_user_ids {
        let id: i64 = raw
            .parse()
            .map_err(|_| AppError::InvalidParam(format!("invalid member id: {raw}")))?;
        if id != owner_id && !member_ids.contains(&id) {
            member_ids.push(id);
        }
    }
    if member_ids.len() < 2 {
        return Err(AppError::InvalidParam("a group needs at least 2 members besides the creator".into()));
    }

    let name = if req.name.trim().is_empty() {
        let mut participant_ids = vec![owner_id];
        participant_ids.extend(member_ids.iter().take(2));
        let names = display_names(state, participant_ids.into_iter()).await?;
        let mut ordered: Vec<String> = Vec::new();
        ordered.push(names.get(&owner_id).cloned().unwrap_or_default());
        for id in member_ids.iter().take(2) {
            ordered.push(names.get(id).cloned().unwrap_or_default());
        }
        ordered.join(", ")
    } else {
        req.name.clone()
    };

    let conversation_id = repo::conversations::create_group(&state.pool, owner_id, &member_ids, &name).await?;
    state.cache.invalidate(conversation_id).await;

    let owner_name = session.display_name().await;
    post_system_message(state, conversation_id, &format!("{owner_name} created the group")).await?;

    wire::reply(
        session,
        state,
        command::CREATE_GROUP_RESP,
        &CreateGroupResponse {
            ok: true,
            conversation_id,
            name,
        },
    );

    push_conv_list(state, owner_id).await?;
    for member_id in member_ids {
        push_conv_list(state, member_id).await?;
    }
    Ok(())
}
