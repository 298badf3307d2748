mod common;

use chat_protocol::*;
use common::TestServer;

/// A frame with no `:` separator is malformed; the server reports it
/// out-of-band and keeps the connection open rather than closing it.
#[tokio::test]
async fn missing_colon_reports_protocol_error_without_closing_connection() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client.send_raw("NOTACOMMANDWITHCOLON").await.unwrap();
    let oob: OutOfBandError = client.recv(command::ERROR).await.unwrap();
    assert_eq!(oob.error_code, codes::PROTOCOL_ERROR);

    // Connection survives: a well-formed frame right after still works.
    client
        .send(
            command::REGISTER,
            &RegisterRequest {
                account: "boundary-user".to_owned(),
                password: "hunter2".to_owned(),
                confirm_password: "hunter2".to_owned(),
            },
        )
        .await
        .unwrap();
    let reg: RegisterResponse = client.recv(command::REGISTER_RESP).await.unwrap();
    assert!(reg.ok);
}

/// An unauthenticated session gets `NOT_AUTHENTICATED` on the *correct*
/// response command -- not a `_REQ_RESP` ghost command nobody listens for.
#[tokio::test]
async fn unauthenticated_request_gets_not_authenticated_on_matching_resp_command() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client
        .send(
            command::HISTORY_REQ,
            &HistoryRequest {
                conversation_id: 0,
                before_seq: 0,
                after_seq: 0,
                limit: Some(10),
            },
        )
        .await
        .unwrap();

    let err: ErrorEnvelope = client.recv(command::HISTORY_RESP).await.unwrap();
    assert_eq!(err.error_code, codes::NOT_AUTHENTICATED);
}

/// A handler-level failure (not a non-member, a not-found conversation)
/// still replies on the matching `_RESP` command rather than `_REQ_RESP`.
#[tokio::test]
async fn handler_error_replies_on_matching_resp_command() {
    let server = TestServer::start().await;
    let (mut client, _login) = common::register_and_login(&server, "boundary-err", "hunter2").await;

    client
        .send(
            command::CONV_MEMBERS_REQ,
            &ConvMembersRequest { conversation_id: 999_999_999 },
        )
        .await
        .unwrap();

    let err: ErrorEnvelope = client.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    assert_eq!(err.error_code, codes::NOT_MEMBER);
}

/// `PING` is answered with `PONG` even before authentication.
#[tokio::test]
async fn ping_is_answered_before_login() {
    let server = TestServer::start().await;
    let mut client = server.connect().await;

    client.send(command::PING, &serde_json::json!({})).await.unwrap();
    let _pong: serde_json::Value = client.recv(command::PONG).await.unwrap();
}

/// An unrecognized command name gets echoed back rather than dropped.
#[tokio::test]
async fn unknown_command_is_echoed() {
    let server = TestServer::start().await;
    let (mut client, _login) = common::register_and_login(&server, "boundary-echo", "hunter2").await;

    client.send("SOMETHING_NEW", &serde_json::json!({"x": 1})).await.unwrap();
    let echoed: serde_json::Value = client.recv(command::ECHO).await.unwrap();
    assert_eq!(echoed["command"], "SOMETHING_NEW");
}

/// Two sockets logging in to the same account both succeed and both keep
/// receiving pushes -- login doesn't evict the other session.
#[tokio::test]
async fn concurrent_logins_for_same_account_both_stay_live() {
    let server = TestServer::start().await;
    let (first, login) = common::register_and_login(&server, "boundary-dual", "hunter2").await;
    let mut second = server.connect().await;
    second
        .send(
            command::LOGIN,
            &LoginRequest { account: "boundary-dual".to_owned(), password: "hunter2".to_owned() },
        )
        .await
        .unwrap();
    let second_login: LoginResponse = second.recv(command::LOGIN_RESP).await.unwrap();
    assert_eq!(second_login.user_id, login.user_id);

    let mut first = first;
    first
        .send(
            command::SEND_MSG,
            &SendMsgRequest {
                conversation_id: login.world_conversation_id,
                conversation_type: Some("GROUP".to_owned()),
                client_msg_id: "dual1".to_owned(),
                msg_type: "TEXT".to_owned(),
                content: "from first socket".to_owned(),
            },
        )
        .await
        .unwrap();

    let _ack: SendAck = first.recv(command::SEND_ACK).await.unwrap();
    let _self_push: MsgPush = first.recv(command::MSG_PUSH).await.unwrap();
    let push: MsgPush = second.recv(command::MSG_PUSH).await.unwrap();
    assert_eq!(push.content, "from first socket");
}
