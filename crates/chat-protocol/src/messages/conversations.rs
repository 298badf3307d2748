use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvSummary {
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    pub conversation_type: String,
    pub title: String,
    pub last_seq: i64,
    pub last_server_time_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvListResponse {
    pub ok: bool,
    pub conversations: Vec<ConvSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvMembersRequest {
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    #[serde(with = "crate::id")]
    pub user_id: i64,
    pub display_name: String,
    pub role: String,
    pub muted_until_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvMembersResponse {
    pub ok: bool,
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    pub members: Vec<MemberSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteMemberRequest {
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    #[serde(with = "crate::id")]
    pub user_id: i64,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmuteMemberRequest {
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    #[serde(with = "crate::id")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminRequest {
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    #[serde(with = "crate::id")]
    pub user_id: i64,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveConvRequest {
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveConvResponse {
    pub ok: bool,
    pub dissolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSingleConvRequest {
    #[serde(with = "crate::id")]
    pub peer_user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSingleConvResponse {
    pub ok: bool,
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub member_user_ids: Vec<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupResponse {
    pub ok: bool,
    #[serde(with = "crate::id")]
    pub conversation_id: i64,
    pub name: String,
}
