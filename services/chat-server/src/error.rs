use chat_protocol::codes;

/// Every failure a handler can report, mapped to a wire-stable error code.
/// Handlers use `?` against this via `#[from]` conversions; the dispatch loop
/// turns the final `Err` into a structured `_RESP`/`ERROR` frame instead of
/// tearing the connection down (only socket-level failures do that).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
    #[error("password confirmation does not match")]
    PasswordMismatch,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("login failed")]
    LoginFailed,
    #[error("account already exists")]
    AccountExists,
    #[error("forbidden")]
    Forbidden,
    #[error("permission denied")]
    PermissionDenied,
    #[error("no permission")]
    NoPermission,
    #[error("not found")]
    NotFound,
    #[error("not a member of this conversation")]
    NotMember,
    #[error("not friends")]
    NotFriend,
    #[error("already friends")]
    AlreadyFriend,
    #[error("a pending request already exists")]
    AlreadyPending,
    #[error("already a member")]
    AlreadyMember,
    #[error("request already handled")]
    AlreadyHandled,
    #[error("invalid state")]
    InvalidState,
    #[error("muted until {until_ms}")]
    Muted { until_ms: i64 },
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("push error: {0}")]
    Push(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidJson(_) => codes::INVALID_JSON,
            AppError::InvalidParam(_) => codes::INVALID_PARAM,
            AppError::PasswordMismatch => codes::PASSWORD_MISMATCH,
            AppError::NotAuthenticated => codes::NOT_AUTHENTICATED,
            AppError::LoginFailed => codes::LOGIN_FAILED,
            AppError::AccountExists => codes::ACCOUNT_EXISTS,
            AppError::Forbidden => codes::FORBIDDEN,
            AppError::PermissionDenied => codes::PERMISSION_DENIED,
            AppError::NoPermission => codes::NO_PERMISSION,
            AppError::NotFound => codes::NOT_FOUND,
            AppError::NotMember => codes::NOT_MEMBER,
            AppError::NotFriend => codes::NOT_FRIEND,
            AppError::AlreadyFriend => codes::ALREADY_FRIEND,
            AppError::AlreadyPending => codes::ALREADY_PENDING,
            AppError::AlreadyMember => codes::ALREADY_MEMBER,
            AppError::AlreadyHandled => codes::ALREADY_HANDLED,
            AppError::InvalidState => codes::INVALID_STATE,
            AppError::Muted { .. } => codes::MUTED,
            AppError::Db(_) => codes::SERVER_ERROR_DB,
            AppError::Push(_) => codes::SERVER_ERROR_PUSH,
        }
    }

    pub fn to_envelope(&self) -> chat_protocol::ErrorEnvelope {
        chat_protocol::ErrorEnvelope::new(self.code(), self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
