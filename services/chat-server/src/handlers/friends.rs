use std::sync::Arc;

use chat_protocol::{
    command, Ack, FriendAcceptRequest, FriendAcceptResponse, FriendAddRequest, FriendAddResponse, FriendDeleteRequest,
    FriendListResponse, FriendReqListResponse, FriendRejectRequest, FriendRequestSummary, FriendSearchRequest,
    FriendSearchResponse, FriendSummary,
};

use crate::error::{AppError, AppResult};
use crate::handlers::conversations::push_conv_list;
use crate::repo;
use crate::state::{AppState, Session};
use crate::wire;

async fn push_friend_list(state: &AppState, user_id: i64) -> AppResult<()> {
    let friends = repo::friends::list_friends(&state.pool, user_id)
        .await?
        .into_iter()
        .map(|f| FriendSummary {
            user_id: f.user_id,
            account: f.account,
            display_name: f.display_name,
        })
        .collect();
    wire::push_to_user(state, user_id, command::FRIEND_LIST_RESP, &FriendListResponse { ok: true, friends }).await;
    Ok(())
}

async fn push_friend_req_list(state: &AppState, user_id: i64) -> AppResult<()> {
    let requests = repo::friends::incoming_requests(&state.pool, user_id)
        .await?
        .into_iter()
        .map(|r| FriendRequestSummary {
            request_id: r.id,
            from_user_id: r.from_user_id,
            account: r.account,
            display_name: r.display_name,
            status: r.status,
            hello_msg: r.hello_msg,
        })
        .collect();
    wire::push_to_user(
        state,
        user_id,
        command::FRIEND_REQ_LIST_RESP,
        &FriendReqListResponse { ok: true, requests },
    )
    .await;
    Ok(())
}

pub async fn handle_friend_list_req(_payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let friends = repo::friends::list_friends(&state.pool, session.user_id())
        .await?
        .into_iter()
        .map(|f| FriendSummary {
            user_id: f.user_id,
            account: f.account,
            display_name: f.display_name,
        })
        .collect();
    wire::reply(session, state, command::FRIEND_LIST_RESP, &FriendListResponse { ok: true, friends });
    Ok(())
}

pub async fn handle_friend_search_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: FriendSearchRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    let found = repo::users::find_by_account(&state.pool, &req.account).await?.ok_or(AppError::NotFound)?;
    let is_self = found.id == user_id;
    let is_friend = !is_self && repo::friends::are_friends(&state.pool, user_id, found.id).await?;

    wire::reply(
        session,
        state,
        command::FRIEND_SEARCH_RESP,
        &FriendSearchResponse {
            ok: true,
            user: FriendSummary {
                user_id: found.id,
                account: found.account,
                display_name: found.display_name,
            },
            is_friend,
            is_self,
        },
    );
    Ok(())
}

pub async fn handle_friend_add_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: FriendAddRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    if req.peer_user_id == user_id {
        return Err(AppError::InvalidParam("cannot friend yourself".into()));
    }
    repo::users::find_by_id(&state.pool, req.peer_user_id).await?.ok_or(AppError::NotFound)?;
    if repo::friends::are_friends(&state.pool, user_id, req.peer_user_id).await? {
        return Err(AppError::AlreadyFriend);
    }
    if repo::friends::find_pending_between(&state.pool, user_id, req.peer_user_id).await?.is_some() {
        return Err(AppError::AlreadyPending);
    }

    let request_id = repo::friends::create_request(&state.pool, user_id, req.peer_user_id, &req.source, &req.hello_msg).await?;

    wire::reply(session, state, command::FRIEND_ADD_RESP, &FriendAddResponse { ok: true, request_id });
    push_friend_req_list(state, req.peer_user_id).await?;
    Ok(())
}

pub async fn handle_friend_req_list_req(_payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let requests = repo::friends::incoming_requests(&state.pool, session.user_id())
        .await?
        .into_iter()
        .map(|r| FriendRequestSummary {
            request_id: r.id,
            from_user_id: r.from_user_id,
            account: r.account,
            display_name: r.display_name,
            status: r.status,
            hello_msg: r.hello_msg,
        })
        .collect();
    wire::reply(session, state, command::FRIEND_REQ_LIST_RESP, &FriendReqListResponse { ok: true, requests });
    Ok(())
}

pub async fn handle_friend_accept_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: FriendAcceptRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    let pending = repo::friends::find_request(&state.pool, req.request_id).await?.ok_or(AppError::NotFound)?;
    if pending.to_user_id != user_id {
        return Err(AppError::Forbidden);
    }
    if pending.status != "PENDING" {
        return Err(AppError::AlreadyHandled);
    }

    repo::friends::mark_accepted(&state.pool, req.request_id).await?;
    repo::friends::insert_symmetric(&state.pool, pending.from_user_id, pending.to_user_id).await?;

    let conversation_id = match repo::conversations::find_single_between(&state.pool, pending.from_user_id, pending.to_user_id).await? {
        Some(id) => id,
        None => {
            let id = repo::conversations::create_single(&state.pool, pending.from_user_id, pending.to_user_id).await?;
            state.cache.invalidate(id).await;
            id
        }
    };

    let requester = repo::users::find_by_id(&state.pool, pending.from_user_id).await?.ok_or(AppError::NotFound)?;

    wire::reply(
        session,
        state,
        command::FRIEND_ACCEPT_RESP,
        &FriendAcceptResponse {
            ok: true,
            friend: FriendSummary {
                user_id: requester.id,
                account: requester.account,
                display_name: requester.display_name,
            },
            conversation_id: conversation_id.to_string(),
            conversation_type: Some("SINGLE".to_owned()),
        },
    );

    for uid in [pending.from_user_id, pending.to_user_id] {
        push_friend_list(state, uid).await?;
        push_friend_req_list(state, uid).await?;
        push_conv_list(state, uid).await?;
    }
    Ok(())
}

pub async fn handle_friend_reject_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: FriendRejectRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    let pending = repo::friends::find_request(&state.pool, req.request_id).await?.ok_or(AppError::NotFound)?;
    if pending.to_user_id != user_id {
        return Err(AppError::Forbidden);
    }
    if pending.status != "PENDING" {
        return Err(AppError::AlreadyHandled);
    }

    repo::friends::mark_rejected(&state.pool, req.request_id).await?;
    wire::reply(session, state, command::FRIEND_REJECT_RESP, &Ack::ok());
    push_friend_req_list(state, pending.from_user_id).await?;
    Ok(())
}

pub async fn handle_friend_delete_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: FriendDeleteRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    if !repo::friends::are_friends(&state.pool, user_id, req.peer_user_id).await? {
        return Err(AppError::NotFriend);
    }
    repo::friends::delete_symmetric(&state.pool, user_id, req.peer_user_id).await?;
    wire::reply(session, state, command::FRIEND_DELETE_RESP, &Ack::ok());
    push_friend_list(state, user_id).await?;
    push_friend_list(state, req.peer_user_id).await?;
    Ok(())
}
