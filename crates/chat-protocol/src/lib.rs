// chat-protocol: wire framing and message types for the chat backend.
//
// The wire is line-delimited `COMMAND:JSON\n`. Unlike a tagged-union
// WebSocket message (one envelope type carrying a `kind` discriminator),
// here the command name already lives in the frame itself, so each
// request/response pair is its own plain struct -- no enum wrapper needed.

pub mod codes;
pub mod frame;
pub mod id;
pub mod messages;

pub use frame::{decode_line, encode, Frame, FrameError};
pub use messages::*;

/// Wire command names, grouped the way `Session`'s dispatch table groups them.
pub mod command {
    pub const REGISTER: &str = "REGISTER";
    pub const REGISTER_RESP: &str = "REGISTER_RESP";
    pub const LOGIN: &str = "LOGIN";
    pub const LOGIN_RESP: &str = "LOGIN_RESP";
    pub const PING: &str = "PING";
    pub const PONG: &str = "PONG";
    pub const SEND_MSG: &str = "SEND_MSG";
    pub const SEND_ACK: &str = "SEND_ACK";
    pub const MSG_PUSH: &str = "MSG_PUSH";
    pub const HISTORY_REQ: &str = "HISTORY_REQ";
    pub const HISTORY_RESP: &str = "HISTORY_RESP";
    pub const CONV_LIST_REQ: &str = "CONV_LIST_REQ";
    pub const CONV_LIST_RESP: &str = "CONV_LIST_RESP";
    pub const CONV_MEMBERS_REQ: &str = "CONV_MEMBERS_REQ";
    pub const CONV_MEMBERS_RESP: &str = "CONV_MEMBERS_RESP";
    pub const PROFILE_UPDATE: &str = "PROFILE_UPDATE";
    pub const PROFILE_UPDATE_RESP: &str = "PROFILE_UPDATE_RESP";
    pub const AVATAR_UPDATE: &str = "AVATAR_UPDATE";
    pub const AVATAR_UPDATE_RESP: &str = "AVATAR_UPDATE_RESP";
    pub const FRIEND_LIST_REQ: &str = "FRIEND_LIST_REQ";
    pub const FRIEND_LIST_RESP: &str = "FRIEND_LIST_RESP";
    pub const FRIEND_SEARCH_REQ: &str = "FRIEND_SEARCH_REQ";
    pub const FRIEND_SEARCH_RESP: &str = "FRIEND_SEARCH_RESP";
    pub const FRIEND_ADD_REQ: &str = "FRIEND_ADD_REQ";
    pub const FRIEND_ADD_RESP: &str = "FRIEND_ADD_RESP";
    pub const FRIEND_REQ_LIST_REQ: &str = "FRIEND_REQ_LIST_REQ";
    pub const FRIEND_REQ_LIST_RESP: &str = "FRIEND_REQ_LIST_RESP";
    pub const FRIEND_ACCEPT_REQ: &str = "FRIEND_ACCEPT_REQ";
    pub const FRIEND_ACCEPT_RESP: &str = "FRIEND_ACCEPT_RESP";
    pub const FRIEND_REJECT_REQ: &str = "FRIEND_REJECT_REQ";
    pub const FRIEND_REJECT_RESP: &str = "FRIEND_REJECT_RESP";
    pub const FRIEND_DELETE_REQ: &str = "FRIEND_DELETE_REQ";
    pub const FRIEND_DELETE_RESP: &str = "FRIEND_DELETE_RESP";
    pub const OPEN_SINGLE_CONV_REQ: &str = "OPEN_SINGLE_CONV_REQ";
    pub const OPEN_SINGLE_CONV_RESP: &str = "OPEN_SINGLE_CONV_RESP";
    pub const CREATE_GROUP_REQ: &str = "CREATE_GROUP_REQ";
    pub const CREATE_GROUP_RESP: &str = "CREATE_GROUP_RESP";
    pub const MUTE_MEMBER_REQ: &str = "MUTE_MEMBER_REQ";
    pub const MUTE_MEMBER_RESP: &str = "MUTE_MEMBER_RESP";
    pub const UNMUTE_MEMBER_REQ: &str = "UNMUTE_MEMBER_REQ";
    pub const UNMUTE_MEMBER_RESP: &str = "UNMUTE_MEMBER_RESP";
    pub const SET_ADMIN_REQ: &str = "SET_ADMIN_REQ";
    pub const SET_ADMIN_RESP: &str = "SET_ADMIN_RESP";
    pub const LEAVE_CONV_REQ: &str = "LEAVE_CONV_REQ";
    pub const LEAVE_CONV_RESP: &str = "LEAVE_CONV_RESP";
    pub const GROUP_SEARCH_REQ: &str = "GROUP_SEARCH_REQ";
    pub const GROUP_SEARCH_RESP: &str = "GROUP_SEARCH_RESP";
    pub const GROUP_JOIN_REQ: &str = "GROUP_JOIN_REQ";
    pub const GROUP_JOIN_RESP: &str = "GROUP_JOIN_RESP";
    pub const GROUP_JOIN_REQ_LIST_REQ: &str = "GROUP_JOIN_REQ_LIST_REQ";
    pub const GROUP_JOIN_REQ_LIST_RESP: &str = "GROUP_JOIN_REQ_LIST_RESP";
    pub const GROUP_JOIN_ACCEPT_REQ: &str = "GROUP_JOIN_ACCEPT_REQ";
    pub const GROUP_JOIN_ACCEPT_RESP: &str = "GROUP_JOIN_ACCEPT_RESP";
    pub const ERROR: &str = "ERROR";
    pub const ECHO: &str = "ECHO";
}
