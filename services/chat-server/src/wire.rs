//! Tiny helpers so handlers never hand-roll `encode` + `push_frame` calls.
//! Every push in this module already accounts for the session's backpressure
//! budget (spec §4.2); handlers just name a command and a payload.

use std::sync::Arc;

use chat_protocol::encode;
use serde::Serialize;

use crate::state::{AppState, Session};

pub fn reply(session: &Arc<Session>, state: &AppState, cmd: &str, payload: &impl Serialize) {
    let body = serde_json::to_string(payload).unwrap_or_default();
    session.push_frame(encode(cmd, &body), state.config.max_outbound_bytes);
}

pub async fn push_to_user(state: &AppState, user_id: i64, cmd: &str, payload: &impl Serialize) {
    let body = serde_json::to_string(payload).unwrap_or_default();
    let frame = encode(cmd, &body);
    state
        .registry
        .push_to_user(user_id, &frame, state.config.max_outbound_bytes)
        .await;
}

pub async fn push_to_users(state: &AppState, user_ids: &[i64], cmd: &str, payload: &impl Serialize) {
    let body = serde_json::to_string(payload).unwrap_or_default();
    let frame = encode(cmd, &body);
    state
        .registry
        .push_to_users(user_ids, &frame, state.config.max_outbound_bytes)
        .await;
}

pub async fn broadcast_conversation(state: &AppState, conversation_id: i64, cmd: &str, payload: &impl Serialize) {
    let body = serde_json::to_string(payload).unwrap_or_default();
    let frame = encode(cmd, &body);
    state.broadcast_to_conversation(conversation_id, &frame).await;
}
