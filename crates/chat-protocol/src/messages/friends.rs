use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendSummary {
    #[serde(with = "crate::id")]
    pub user_id: i64,
    pub account: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendListResponse {
    pub ok: bool,
    pub friends: Vec<FriendSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendSearchRequest {
    pub account: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendSearchResponse {
    pub ok: bool,
    pub user: FriendSummary,
    pub is_friend: bool,
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendAddRequest {
    #[serde(with = "crate::id")]
    pub peer_user_id: i64,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub hello_msg: String,
}

fn default_source() -> String {
    "search_account".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendAddResponse {
    pub ok: bool,
    #[serde(with = "crate::id")]
    pub request_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestSummary {
    #[serde(with = "crate::id")]
    pub request_id: i64,
    #[serde(with = "crate::id")]
    pub from_user_id: i64,
    pub account: String,
    pub display_name: String,
    pub status: String,
    pub hello_msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendReqListResponse {
    pub ok: bool,
    pub requests: Vec<FriendRequestSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendAcceptRequest {
    #[serde(with = "crate::id")]
    pub request_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendAcceptResponse {
    pub ok: bool,
    pub friend: FriendSummary,
    /// Empty string when, implausibly, no conversation could be attached.
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRejectRequest {
    #[serde(with = "crate::id")]
    pub request_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendDeleteRequest {
    #[serde(with = "crate::id")]
    pub peer_user_id: i64,
}
