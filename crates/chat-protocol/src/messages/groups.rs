use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSearchRequest {
    #[serde(with = "crate::id")]
    pub group_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSearchResponse {
    pub ok: bool,
    #[serde(with = "crate::id")]
    pub group_id: i64,
    pub name: String,
    pub member_count: i64,
    pub is_member: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJoinRequest {
    #[serde(with = "crate::id")]
    pub group_id: i64,
    #[serde(default)]
    pub hello_msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJoinResponse {
    pub ok: bool,
    #[serde(with = "crate::id")]
    pub request_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJoinRequestSummary {
    #[serde(with = "crate::id")]
    pub request_id: i64,
    #[serde(with = "crate::id")]
    pub from_user_id: i64,
    pub account: String,
    pub display_name: String,
    #[serde(with = "crate::id")]
    pub group_id: i64,
    pub group_name: String,
    pub status: String,
    pub hello_msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJoinReqListResponse {
    pub ok: bool,
    pub requests: Vec<GroupJoinRequestSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJoinAcceptRequest {
    #[serde(with = "crate::id")]
    pub request_id: i64,
    pub accept: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJoinAcceptResponse {
    pub ok: bool,
}
