//! Wire-stable error codes. These strings are the contract; never rename one
//! once a client depends on it, add a new one instead.

pub const INVALID_JSON: &str = "INVALID_JSON";
pub const INVALID_PARAM: &str = "INVALID_PARAM";
pub const PASSWORD_MISMATCH: &str = "PASSWORD_MISMATCH";

pub const NOT_AUTHENTICATED: &str = "NOT_AUTHENTICATED";
pub const LOGIN_FAILED: &str = "LOGIN_FAILED";
pub const ACCOUNT_EXISTS: &str = "ACCOUNT_EXISTS";

pub const FORBIDDEN: &str = "FORBIDDEN";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const NO_PERMISSION: &str = "NO_PERMISSION";

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const NOT_MEMBER: &str = "NOT_MEMBER";
pub const NOT_FRIEND: &str = "NOT_FRIEND";
pub const ALREADY_FRIEND: &str = "ALREADY_FRIEND";
pub const ALREADY_PENDING: &str = "ALREADY_PENDING";
pub const ALREADY_MEMBER: &str = "ALREADY_MEMBER";
pub const ALREADY_HANDLED: &str = "ALREADY_HANDLED";
pub const INVALID_STATE: &str = "INVALID_STATE";
pub const MUTED: &str = "MUTED";

pub const SERVER_ERROR: &str = "SERVER_ERROR";
pub const SERVER_ERROR_DB: &str = "SERVER_ERROR_DB";
pub const SERVER_ERROR_PUSH: &str = "SERVER_ERROR_PUSH";
pub const PROTOCOL_ERROR: &str = "PROTOCOL_ERROR";
