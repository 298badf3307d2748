use serde::{Deserialize, Serialize};

/// `senderId` is accepted on the wire for symmetry with `MSG_PUSH` but the
/// server ignores it and uses the authenticated session's user id instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMsgRequest {
    /// Empty or absent means the world conversation.
    #[serde(default, with = "crate::id::optional_or_zero")]
    pub conversation_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<String>,
    #[serde(default)]
    pub client_msg_id: String,
    #[serde(default = "default_msg_type")]
    pub msg_type: String,
    pub content: String,
}

fn default_msg_type() -> String {
    "TEXT".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAck {
    pub client_msg_id: String,
    #[serde(with = "crate::id")]
    pub server_msg_id: i64,
    pub server_time_ms: i64,
    pub seq: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgPush {
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    pub conversation_type: String,
    #[serde(with = "crate::id")]
    pub server_msg_id: i64,
    #[serde(with = "crate::id")]
    pub sender_id: i64,
    pub sender_display_name: String,
    pub msg_type: String,
    pub server_time_ms: i64,
    pub seq: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    #[serde(default, with = "crate::id::optional_or_zero")]
    pub conversation_id: i64,
    #[serde(default)]
    pub before_seq: i64,
    #[serde(default)]
    pub after_seq: i64,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    #[serde(with = "crate::id")]
    pub server_msg_id: i64,
    #[serde(with = "crate::id")]
    pub sender_id: i64,
    pub sender_display_name: String,
    pub msg_type: String,
    pub server_time_ms: i64,
    pub seq: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub ok: bool,
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    pub messages: Vec<HistoryMessage>,
    pub has_more: bool,
    pub next_before_seq: i64,
}
