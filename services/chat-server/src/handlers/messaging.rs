use std::sync::Arc;

use chat_protocol::{command, HistoryMessage, HistoryRequest, HistoryResponse, MsgPush, OutOfBandError, SendAck, SendMsgRequest};

use crate::error::{AppError, AppResult};
use crate::handlers::now_ms;
use crate::repo;
use crate::state::{AppState, Session};
use crate::wire;

/// Runs on its own task (spec §4.2): persistence must not block the read
/// loop. Failures are reported out-of-band via `ERROR`, since `SEND_MSG` has
/// no `_RESP` counterpart on the wire -- only `SEND_ACK` on success.
pub async fn handle_send_msg(payload: &str, session: &Arc<Session>, state: &AppState) {
    if let Err(err) = try_send_msg(payload, session, state).await {
        let envelope = OutOfBandError::new(err.code(), err.to_string());
        let body = serde_json::to_string(&envelope).unwrap_or_default();
        session.push_frame(
            chat_protocol::encode(command::ERROR, &body),
            state.config.max_outbound_bytes,
        );
    }
}

async fn try_send_msg(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: SendMsgRequest = serde_json::from_str(payload)?;
    if req.content.is_empty() {
        return Err(AppError::InvalidParam("content is required".into()));
    }

    let sender_id = session.user_id();
    let conversation_id = if req.conversation_id <= 0 {
        state.world_conversation_id
    } else {
        req.conversation_id
    };
    let is_world = conversation_id == state.world_conversation_id;

    if !is_world {
        let membership = repo::conversations::find_membership(&state.pool, conversation_id, sender_id)
            .await?
            .ok_or(AppError::NotMember)?;
        let now = now_ms();
        if membership.muted_until_ms > now {
            return Err(AppError::Muted {
                until_ms: membership.muted_until_ms,
            });
        }
    }

    let conv = repo::conversations::find(&state.pool, conversation_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let server_time_ms = now_ms();
    let stored = repo::messages::allocate_and_insert(
        &state.pool,
        conversation_id,
        sender_id,
        &req.msg_type,
        &req.content,
        server_time_ms,
    )
    .await?;

    wire::reply(
        session,
        state,
        command::SEND_ACK,
        &SendAck {
            client_msg_id: req.client_msg_id,
            server_msg_id: stored.id,
            server_time_ms: stored.server_time_ms,
            seq: stored.seq,
        },
    );

    let sender_display_name = session.display_name().await;
    let push = MsgPush {
        conversation_id,
        conversation_type: conv.conv_type,
        server_msg_id: stored.id,
        sender_id,
        sender_display_name,
        msg_type: req.msg_type,
        server_time_ms: stored.server_time_ms,
        seq: stored.seq,
        content: req.content,
    };
    wire::broadcast_conversation(state, conversation_id, command::MSG_PUSH, &push).await;
    Ok(())
}

/// Ascending-`seq` window per spec §4.7: `afterSeq` takes priority over
/// `beforeSeq`; with neither set, returns the most recent `limit` messages.
pub async fn handle_history_req(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: HistoryRequest = serde_json::from_str(payload)?;
    let conversation_id = if req.conversation_id <= 0 {
        state.world_conversation_id
    } else {
        req.conversation_id
    };
    let limit = req.limit.filter(|l| *l > 0).unwrap_or(50);

    let rows = if req.after_seq > 0 {
        repo::messages::after_seq(&state.pool, conversation_id, req.after_seq, limit).await?
    } else if req.before_seq > 0 {
        repo::messages::before_seq(&state.pool, conversation_id, req.before_seq, limit).await?
    } else {
        repo::messages::latest(&state.pool, conversation_id, limit).await?
    };

    let min_seq = rows.first().map(|r| r.seq).unwrap_or(0);
    let has_more = if min_seq > 0 {
        repo::messages::has_earlier(&state.pool, conversation_id, min_seq).await?
    } else {
        false
    };

    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        let sender_display_name = if row.sender_id == 0 {
            String::new()
        } else {
            repo::users::find_by_id(&state.pool, row.sender_id)
                .await?
                .map(|u| u.display_name)
                .unwrap_or_default()
        };
        messages.push(HistoryMessage {
            server_msg_id: row.id,
            sender_id: row.sender_id,
            sender_display_name,
            msg_type: row.msg_type,
            server_time_ms: row.server_time_ms,
            seq: row.seq,
            content: row.content,
        });
    }

    wire::reply(
        session,
        state,
        command::HISTORY_RESP,
        &HistoryResponse {
            ok: true,
            conversation_id,
            messages,
            has_more,
            next_before_seq: min_seq,
        },
    );
    Ok(())
}
