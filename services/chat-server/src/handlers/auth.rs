use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chat_protocol::{
    command, AvatarUpdateRequest, AvatarUpdateResponse, LoginRequest, LoginResponse, ProfileUpdateRequest,
    ProfileUpdateResponse, RegisterRequest, RegisterResponse,
};

use crate::auth::random_display_name;
use crate::error::{AppError, AppResult};
use crate::repo;
use crate::state::{AppState, Session};
use crate::wire;

pub async fn handle_register(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: RegisterRequest = serde_json::from_str(payload)?;
    if req.account.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidParam("account and password are required".into()));
    }
    if req.password != req.confirm_password {
        return Err(AppError::PasswordMismatch);
    }
    if repo::users::find_by_account(&state.pool, &req.account).await?.is_some() {
        return Err(AppError::AccountExists);
    }

    let display_name = random_display_name();
    let stored_password = state.credentials.hash(&req.password);
    let user = repo::users::create(&state.pool, &req.account, &stored_password, &display_name).await?;
    repo::conversations::add_member(&state.pool, state.world_conversation_id, user.id, "MEMBER").await?;
    state.cache.invalidate(state.world_conversation_id).await;

    wire::reply(
        session,
        state,
        command::REGISTER_RESP,
        &RegisterResponse {
            ok: true,
            user_id: user.id,
            display_name: user.display_name,
            avatar_path: user.avatar_path,
        },
    );
    Ok(())
}

pub async fn handle_login(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: LoginRequest = serde_json::from_str(payload)?;
    let user = repo::users::find_by_account(&state.pool, &req.account)
        .await?
        .ok_or(AppError::LoginFailed)?;
    if !state.credentials.verify(&req.password, &user.password) {
        return Err(AppError::LoginFailed);
    }

    session.set_authenticated(user.id, &user.display_name).await;
    state.registry.index_by_user(user.id, session).await;

    wire::reply(
        session,
        state,
        command::LOGIN_RESP,
        &LoginResponse {
            ok: true,
            user_id: user.id,
            account: user.account,
            display_name: user.display_name,
            avatar_path: user.avatar_path,
            world_conversation_id: state.world_conversation_id,
        },
    );
    Ok(())
}

pub async fn handle_profile_update(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: ProfileUpdateRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();

    let display_name = match req.display_name {
        Some(name) if !name.trim().is_empty() => {
            repo::users::update_display_name(&state.pool, user_id, &name).await?;
            session.set_display_name(&name).await;
            name
        }
        _ => session.display_name().await,
    };

    wire::reply(
        session,
        state,
        command::PROFILE_UPDATE_RESP,
        &ProfileUpdateResponse {
            ok: true,
            user_id,
            display_name,
        },
    );
    Ok(())
}

/// Avatars are carried as base64 on the existing text frame (spec Non-goals
/// explicitly rule out a richer media transport) and stored under the
/// configured avatar directory, one file per user.
pub async fn handle_avatar_update(payload: &str, session: &Arc<Session>, state: &AppState) -> AppResult<()> {
    let req: AvatarUpdateRequest = serde_json::from_str(payload)?;
    let user_id = session.user_id();
    let bytes = BASE64
        .decode(req.avatar_base64.as_bytes())
        .map_err(|_| AppError::InvalidParam("avatarBase64 is not valid base64".into()))?;

    tokio::fs::create_dir_all(&state.config.avatar_dir)
        .await
        .map_err(|e| AppError::InvalidParam(format!("could not prepare avatar storage: {e}")))?;
    let avatar_path = format!("{}/{user_id}.avatar", state.config.avatar_dir);
    tokio::fs::write(&avatar_path, &bytes)
        .await
        .map_err(|e| AppError::InvalidParam(format!("could not write avatar: {e}")))?;

    repo::users::update_avatar_path(&state.pool, user_id, &avatar_path).await?;

    wire::reply(
        session,
        state,
        command::AVATAR_UPDATE_RESP,
        &AvatarUpdateResponse {
            ok: true,
            avatar_path,
        },
    );
    Ok(())
}
