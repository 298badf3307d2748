//! Per-connection state machine (spec §4.2): read one frame, dispatch, loop.
//! The writer half runs as an independent task draining the outbound queue
//! in strict FIFO so a slow or malicious peer can never stall another
//! session's delivery.

use std::sync::Arc;

use chat_protocol::{command, decode_line, encode};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::state::{AppState, OutboundMsg, Session};

pub async fn run(stream: TcpStream, state: AppState) {
    let peer = stream.peer_addr().ok();
    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();

    let session_id = state.registry.next_id();
    let session = Session::new(session_id, tx);
    state.registry.register(session.clone()).await;

    let writer_task = tokio::spawn(writer_loop(write_half, rx, session.clone()));

    read_loop(read_half, &session, &state).await;

    session.mark_closing();
    state.registry.remove(session_id).await;
    writer_task.abort();
    debug!(?peer, session_id, "session closed");
}

async fn writer_loop(
    mut write_half: tokio::net::tcp::OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<OutboundMsg>,
    session: Arc<Session>,
) {
    while let Some(msg) = rx.recv().await {
        match msg {
            OutboundMsg::Frame(frame) => {
                let len = frame.len();
                if write_half.write_all(frame.as_bytes()).await.is_err() {
                    session.mark_closing();
                    break;
                }
                session.note_frame_written(len);
            }
            OutboundMsg::Close => {
                let _ = write_half.shutdown().await;
                break;
            }
        }
    }
}

async fn read_loop(read_half: tokio::net::tcp::OwnedReadHalf, session: &Arc<Session>, state: &AppState) {
    let mut reader = BufReader::new(read_half);
    let max_line = state.config.max_line_bytes;
    loop {
        let mut line = String::new();
        let read = tokio::select! {
            result = read_line_bounded(&mut reader, &mut line, max_line) => result,
        };
        match read {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let frame = match decode_line(&line) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(_) => {
                send_out_of_band_error(session, state, chat_protocol::codes::PROTOCOL_ERROR, "malformed frame");
                continue;
            }
        };

        dispatch(frame, session, state).await;
    }
}

/// Reads one line, refusing to grow the buffer past `max_line` bytes (the
/// 10 MiB single-frame boundary spec §8 requires to fail gracefully).
async fn read_line_bounded<R: AsyncBufReadExt + Unpin>(
    reader: &mut R,
    buf: &mut String,
    max_line: usize,
) -> std::io::Result<usize> {
    let mut total = 0;
    loop {
        let mut chunk = String::new();
        let n = reader.read_line(&mut chunk).await?;
        if n == 0 {
            return Ok(total);
        }
        total += n;
        let ended = chunk.ends_with('\n');
        buf.push_str(&chunk);
        if total > max_line {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "frame too large"));
        }
        if ended {
            return Ok(total);
        }
    }
}

fn send_out_of_band_error(session: &Arc<Session>, state: &AppState, code: &str, msg: &str) {
    let payload = serde_json::to_string(&chat_protocol::OutOfBandError::new(code, msg)).unwrap_or_default();
    let frame = encode(command::ERROR, &payload);
    session.push_frame(frame, state.config.max_outbound_bytes);
}

async fn dispatch(frame: chat_protocol::Frame, session: &Arc<Session>, state: &AppState) {
    let cmd = frame.command.as_str();

    if cmd == command::PING {
        reply(session, state, command::PONG, &serde_json::json!({}));
        return;
    }

    if !session.is_authenticated() && cmd != command::REGISTER && cmd != command::LOGIN {
        let resp_cmd = response_command_for(cmd);
        reply_error(session, state, &resp_cmd, cmd, crate::error::AppError::NotAuthenticated);
        return;
    }

    // SEND_MSG runs persistence before it can ack; it must not block the
    // read loop, so it's handed to its own task (spec §4.2).
    if cmd == command::SEND_MSG {
        let state = state.clone();
        let session = session.clone();
        tokio::spawn(async move {
            crate::handlers::messaging::handle_send_msg(&frame.payload, &session, &state).await;
        });
        return;
    }

    let payload = frame.payload.as_str();
    let result = match cmd {
        command::REGISTER => crate::handlers::auth::handle_register(payload, session, state).await,
        command::LOGIN => crate::handlers::auth::handle_login(payload, session, state).await,
        command::PROFILE_UPDATE => crate::handlers::auth::handle_profile_update(payload, session, state).await,
        command::AVATAR_UPDATE => crate::handlers::auth::handle_avatar_update(payload, session, state).await,
        command::HISTORY_REQ => crate::handlers::messaging::handle_history_req(payload, session, state).await,
        command::CONV_LIST_REQ => crate::handlers::conversations::handle_conv_list_req(payload, session, state).await,
        command::CONV_MEMBERS_REQ => {
            crate::handlers::conversations::handle_conv_members_req(payload, session, state).await
        }
        command::MUTE_MEMBER_REQ => {
            crate::handlers::conversations::handle_mute_member_req(payload, session, state).await
        }
        command::UNMUTE_MEMBER_REQ => {
            crate::handlers::conversations::handle_unmute_member_req(payload, session, state).await
        }
        command::SET_ADMIN_REQ => crate::handlers::conversations::handle_set_admin_req(payload, session, state).await,
        command::LEAVE_CONV_REQ => crate::handlers::conversations::handle_leave_conv_req(payload, session, state).await,
        command::OPEN_SINGLE_CONV_REQ => {
            crate::handlers::conversations::handle_open_single_conv_req(payload, session, state).await
        }
        command::CREATE_GROUP_REQ => {
            crate::handlers::conversations::handle_create_group_req(payload, session, state).await
        }
        command::FRIEND_LIST_REQ => crate::handlers::friends::handle_friend_list_req(payload, session, state).await,
        command::FRIEND_SEARCH_REQ => crate::handlers::friends::handle_friend_search_req(payload, session, state).await,
        command::FRIEND_ADD_REQ => crate::handlers::friends::handle_friend_add_req(payload, session, state).await,
        command::FRIEND_REQ_LIST_REQ => {
            crate::handlers::friends::handle_friend_req_list_req(payload, session, state).await
        }
        command::FRIEND_ACCEPT_REQ => crate::handlers::friends::handle_friend_accept_req(payload, session, state).await,
        command::FRIEND_REJECT_REQ => crate::handlers::friends::handle_friend_reject_req(payload, session, state).await,
        command::FRIEND_DELETE_REQ => crate::handlers::friends::handle_friend_delete_req(payload, session, state).await,
        command::GROUP_SEARCH_REQ => crate::handlers::groups::handle_group_search_req(payload, session, state).await,
        command::GROUP_JOIN_REQ => crate::handlers::groups::handle_group_join_req(payload, session, state).await,
        command::GROUP_JOIN_REQ_LIST_REQ => {
            crate::handlers::groups::handle_group_join_req_list_req(payload, session, state).await
        }
        command::GROUP_JOIN_ACCEPT_REQ => {
            crate::handlers::groups::handle_group_join_accept_req(payload, session, state).await
        }
        other => {
            let echo = serde_json::json!({ "command": other });
            reply(session, state, command::ECHO, &echo);
            return;
        }
    };

    if let Err(err) = result {
        let resp_cmd = response_command_for(cmd);
        reply_error(session, state, &resp_cmd, cmd, err);
    }
}

/// Every request command's success reply drops a trailing `_REQ` before
/// adding `_RESP` (`HISTORY_REQ` -> `HISTORY_RESP`, `REGISTER` -> `REGISTER_RESP`
/// since it has no `_REQ` to strip); the error path mirrors that so a
/// rejected request and its successful twin always land on the same command.
fn response_command_for(cmd: &str) -> String {
    format!("{}_RESP", cmd.strip_suffix("_REQ").unwrap_or(cmd))
}

fn reply(session: &Arc<Session>, state: &AppState, resp_cmd: &str, payload: &serde_json::Value) {
    crate::wire::reply(session, state, resp_cmd, payload);
}

fn reply_error(session: &Arc<Session>, state: &AppState, resp_cmd: &str, request_cmd: &str, err: crate::error::AppError) {
    warn!(command = request_cmd, error = %err, "handler error");
    crate::wire::reply(session, state, resp_cmd, &err.to_envelope());
}
