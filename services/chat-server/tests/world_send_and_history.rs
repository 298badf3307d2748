mod common;

use chat_protocol::*;
use common::{register_and_login, TestServer};

/// Spec scenario 1: world send fan-out. A sends, B and C each see exactly one
/// MSG_PUSH carrying the same seq/serverMsgId/content A got acked with.
#[tokio::test]
async fn world_send_fans_out_to_every_member() {
    let server = TestServer::start().await;
    let (mut a, login_a) = register_and_login(&server, "alice", "hunter2").await;
    let (mut b, _) = register_and_login(&server, "bob", "hunter2").await;
    let (mut c, _) = register_and_login(&server, "carol", "hunter2").await;

    a.send(
        command::SEND_MSG,
        &SendMsgRequest {
            conversation_id: login_a.world_conversation_id,
            conversation_type: Some("GROUP".to_owned()),
            client_msg_id: "c1".to_owned(),
            msg_type: "TEXT".to_owned(),
            content: "hi".to_owned(),
        },
    )
    .await
    .unwrap();

    let ack: SendAck = a.recv(command::SEND_ACK).await.unwrap();
    assert_eq!(ack.client_msg_id, "c1");

    for client in [&mut b, &mut c] {
        let push: MsgPush = client.recv(command::MSG_PUSH).await.unwrap();
        assert_eq!(push.seq, ack.seq);
        assert_eq!(push.server_msg_id, ack.server_msg_id);
        assert_eq!(push.sender_id, login_a.user_id);
        assert_eq!(push.content, "hi");
    }

    // A also observes its own broadcast (source confirms full-membership fan-out).
    let self_push: MsgPush = a.recv(command::MSG_PUSH).await.unwrap();
    assert_eq!(self_push.seq, ack.seq);
}

/// Spec scenario 3: gap-free history, ascending `afterSeq`/`beforeSeq` windows.
#[tokio::test]
async fn history_is_gap_free_and_respects_seq_windows() {
    let server = TestServer::start().await;
    let (mut a, login_a) = register_and_login(&server, "dave", "hunter2").await;

    for i in 0..10 {
        a.send(
            command::SEND_MSG,
            &SendMsgRequest {
                conversation_id: login_a.world_conversation_id,
                conversation_type: Some("GROUP".to_owned()),
                client_msg_id: format!("m{i}"),
                msg_type: "TEXT".to_owned(),
                content: format!("msg {i}"),
            },
        )
        .await
        .unwrap();
        let _ack: SendAck = a.recv(command::SEND_ACK).await.unwrap();
        let _push: MsgPush = a.recv(command::MSG_PUSH).await.unwrap();
    }

    a.send(
        command::HISTORY_REQ,
        &HistoryRequest {
            conversation_id: login_a.world_conversation_id,
            before_seq: 0,
            after_seq: 0,
            limit: Some(100),
        },
    )
    .await
    .unwrap();
    let resp: HistoryResponse = a.recv(command::HISTORY_RESP).await.unwrap();
    let seqs: Vec<i64> = resp.messages.iter().map(|m| m.seq).collect();
    let expected: Vec<i64> = (1..=10).collect();
    assert_eq!(seqs, expected);
    assert!(!resp.has_more);

    a.send(
        command::HISTORY_REQ,
        &HistoryRequest {
            conversation_id: login_a.world_conversation_id,
            before_seq: 0,
            after_seq: 5,
            limit: Some(200),
        },
    )
    .await
    .unwrap();
    let resp: HistoryResponse = a.recv(command::HISTORY_RESP).await.unwrap();
    let seqs: Vec<i64> = resp.messages.iter().map(|m| m.seq).collect();
    assert_eq!(seqs, (6..=10).collect::<Vec<i64>>());
}

#[tokio::test]
async fn login_twice_returns_same_user_id() {
    let server = TestServer::start().await;
    let (_client, first) = register_and_login(&server, "erin", "hunter2").await;

    let mut second = server.connect().await;
    second
        .send(command::LOGIN, &LoginRequest { account: "erin".to_owned(), password: "hunter2".to_owned() })
        .await
        .unwrap();
    let second_login: LoginResponse = second.recv(command::LOGIN_RESP).await.unwrap();
    assert_eq!(second_login.user_id, first.user_id);
}
