mod common;

use chat_protocol::*;
use common::{register_and_login, TestServer};

/// Spec scenario 2: an admin mute blocks `SEND_MSG` until it's lifted.
#[tokio::test]
async fn mute_blocks_send_until_unmuted() {
    let server = TestServer::start().await;
    let (mut owner, login_owner) = register_and_login(&server, "owner1", "hunter2").await;
    let (mut member_b, login_b) = register_and_login(&server, "member-b", "hunter2").await;
    let (mut member_c, _login_c) = register_and_login(&server, "member-c", "hunter2").await;

    owner
        .send(
            command::CREATE_GROUP_REQ,
            &CreateGroupRequest {
                member_user_ids: vec![login_b.user_id.to_string(), _login_c.user_id.to_string()],
                name: "moderators".to_owned(),
            },
        )
        .await
        .unwrap();

    let _owner_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let created: CreateGroupResponse = owner.recv(command::CREATE_GROUP_RESP).await.unwrap();
    let _owner_conv_list: ConvListResponse = owner.recv(command::CONV_LIST_RESP).await.unwrap();
    let group_id = created.conversation_id;

    let _b_system: MsgPush = member_b.recv(command::MSG_PUSH).await.unwrap();
    let _b_conv_list: ConvListResponse = member_b.recv(command::CONV_LIST_RESP).await.unwrap();
    let _c_system: MsgPush = member_c.recv(command::MSG_PUSH).await.unwrap();
    let _c_conv_list: ConvListResponse = member_c.recv(command::CONV_LIST_RESP).await.unwrap();

    owner
        .send(
            command::MUTE_MEMBER_REQ,
            &MuteMemberRequest {
                conversation_id: group_id,
                user_id: login_b.user_id,
                duration_seconds: 60,
            },
        )
        .await
        .unwrap();

    let _owner_mute_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let _owner_members: ConvMembersResponse = owner.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    let ack: Ack = owner.recv(command::MUTE_MEMBER_RESP).await.unwrap();
    assert!(ack.ok);

    let _b_mute_system: MsgPush = member_b.recv(command::MSG_PUSH).await.unwrap();
    let _b_members: ConvMembersResponse = member_b.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    let _c_mute_system: MsgPush = member_c.recv(command::MSG_PUSH).await.unwrap();
    let _c_members: ConvMembersResponse = member_c.recv(command::CONV_MEMBERS_RESP).await.unwrap();

    member_b
        .send(
            command::SEND_MSG,
            &SendMsgRequest {
                conversation_id: group_id,
                conversation_type: Some("GROUP".to_owned()),
                client_msg_id: "muted-attempt".to_owned(),
                msg_type: "TEXT".to_owned(),
                content: "can you hear me".to_owned(),
            },
        )
        .await
        .unwrap();

    let oob: OutOfBandError = member_b.recv(command::ERROR).await.unwrap();
    assert_eq!(oob.error_code, codes::MUTED);

    owner
        .send(
            command::UNMUTE_MEMBER_REQ,
            &UnmuteMemberRequest {
                conversation_id: group_id,
                user_id: login_b.user_id,
            },
        )
        .await
        .unwrap();

    let _owner_unmute_members: ConvMembersResponse = owner.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    let ack: Ack = owner.recv(command::UNMUTE_MEMBER_RESP).await.unwrap();
    assert!(ack.ok);
    let _b_unmute_members: ConvMembersResponse = member_b.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    let _c_unmute_members: ConvMembersResponse = member_c.recv(command::CONV_MEMBERS_RESP).await.unwrap();

    member_b
        .send(
            command::SEND_MSG,
            &SendMsgRequest {
                conversation_id: group_id,
                conversation_type: Some("GROUP".to_owned()),
                client_msg_id: "unmuted-attempt".to_owned(),
                msg_type: "TEXT".to_owned(),
                content: "now you can".to_owned(),
            },
        )
        .await
        .unwrap();
    let send_ack: SendAck = member_b.recv(command::SEND_ACK).await.unwrap();
    assert_eq!(send_ack.client_msg_id, "unmuted-attempt");

    for client in [&mut owner, &mut member_b, &mut member_c] {
        let push: MsgPush = client.recv(command::MSG_PUSH).await.unwrap();
        assert_eq!(push.content, "now you can");
    }
}

/// A non-admin member cannot mute anyone else.
#[tokio::test]
async fn mute_requires_admin_role() {
    let server = TestServer::start().await;
    let (mut owner, _login_owner) = register_and_login(&server, "owner2", "hunter2").await;
    let (mut member_b, login_b) = register_and_login(&server, "plain-member", "hunter2").await;
    let (_member_c, login_c) = register_and_login(&server, "other-member", "hunter2").await;

    owner
        .send(
            command::CREATE_GROUP_REQ,
            &CreateGroupRequest {
                member_user_ids: vec![login_b.user_id.to_string(), login_c.user_id.to_string()],
                name: "plain group".to_owned(),
            },
        )
        .await
        .unwrap();
    let _owner_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let created: CreateGroupResponse = owner.recv(command::CREATE_GROUP_RESP).await.unwrap();
    let group_id = created.conversation_id;

    member_b
        .send(
            command::MUTE_MEMBER_REQ,
            &MuteMemberRequest {
                conversation_id: group_id,
                user_id: login_c.user_id,
                duration_seconds: 30,
            },
        )
        .await
        .unwrap();

    let _b_system: MsgPush = member_b.recv(command::MSG_PUSH).await.unwrap();
    let _b_conv_list: ConvListResponse = member_b.recv(command::CONV_LIST_RESP).await.unwrap();
    let err: ErrorEnvelope = member_b.recv(command::MUTE_MEMBER_RESP).await.unwrap();
    assert_eq!(err.error_code, codes::PERMISSION_DENIED);
}
