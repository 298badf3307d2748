mod common;

use chat_protocol::*;
use common::{register_and_login, TestServer};

/// Spec scenario 5: the owner leaving a group dissolves it for everyone.
#[tokio::test]
async fn owner_leave_dissolves_group_for_all_members() {
    let server = TestServer::start().await;
    let (mut owner, _login_owner) = register_and_login(&server, "dissolve-owner", "hunter2").await;
    let (mut member_b, _login_b) = register_and_login(&server, "dissolve-b", "hunter2").await;
    let (mut member_c, _login_c) = register_and_login(&server, "dissolve-c", "hunter2").await;

    owner
        .send(
            command::CREATE_GROUP_REQ,
            &CreateGroupRequest {
                member_user_ids: vec![_login_b.user_id.to_string(), _login_c.user_id.to_string()],
                name: "temporary club".to_owned(),
            },
        )
        .await
        .unwrap();
    let _owner_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let created: CreateGroupResponse = owner.recv(command::CREATE_GROUP_RESP).await.unwrap();
    let group_id = created.conversation_id;
    let _owner_conv_list: ConvListResponse = owner.recv(command::CONV_LIST_RESP).await.unwrap();
    let _b_system: MsgPush = member_b.recv(command::MSG_PUSH).await.unwrap();
    let _b_conv_list: ConvListResponse = member_b.recv(command::CONV_LIST_RESP).await.unwrap();
    let _c_system: MsgPush = member_c.recv(command::MSG_PUSH).await.unwrap();
    let _c_conv_list: ConvListResponse = member_c.recv(command::CONV_LIST_RESP).await.unwrap();

    owner
        .send(command::LEAVE_CONV_REQ, &LeaveConvRequest { conversation_id: group_id })
        .await
        .unwrap();

    // Every member, including the owner, sees the dissolution SYSTEM message
    // followed by a conversation list that no longer carries the group.
    let owner_dissolve_push: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    assert_eq!(owner_dissolve_push.msg_type, "SYSTEM");
    assert_eq!(owner_dissolve_push.conversation_id, group_id);
    let owner_conv_list: ConvListResponse = owner.recv(command::CONV_LIST_RESP).await.unwrap();
    assert!(!owner_conv_list.conversations.iter().any(|c| c.conversation_id == group_id));
    let leave_resp: LeaveConvResponse = owner.recv(command::LEAVE_CONV_RESP).await.unwrap();
    assert!(leave_resp.ok);
    assert!(leave_resp.dissolved);

    for client in [&mut member_b, &mut member_c] {
        let push: MsgPush = client.recv(command::MSG_PUSH).await.unwrap();
        assert_eq!(push.msg_type, "SYSTEM");
        let conv_list: ConvListResponse = client.recv(command::CONV_LIST_RESP).await.unwrap();
        assert!(!conv_list.conversations.iter().any(|c| c.conversation_id == group_id));
    }

    // History on a dissolved conversation comes back empty (messages were
    // deleted with the conversation, spec.md §9's no-audit-retention answer).
    member_b
        .send(
            command::HISTORY_REQ,
            &HistoryRequest {
                conversation_id: group_id,
                before_seq: 0,
                after_seq: 0,
                limit: Some(50),
            },
        )
        .await
        .unwrap();
    let history: HistoryResponse = member_b.recv(command::HISTORY_RESP).await.unwrap();
    assert!(history.messages.is_empty());
}

/// A non-owner member leaving just removes them; the group survives.
#[tokio::test]
async fn member_leave_does_not_dissolve() {
    let server = TestServer::start().await;
    let (mut owner, _login_owner) = register_and_login(&server, "surv-owner", "hunter2").await;
    let (mut member_b, login_b) = register_and_login(&server, "surv-b", "hunter2").await;
    let (mut member_c, _login_c) = register_and_login(&server, "surv-c", "hunter2").await;

    owner
        .send(
            command::CREATE_GROUP_REQ,
            &CreateGroupRequest {
                member_user_ids: vec![login_b.user_id.to_string(), _login_c.user_id.to_string()],
                name: "surviving club".to_owned(),
            },
        )
        .await
        .unwrap();
    let _owner_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let created: CreateGroupResponse = owner.recv(command::CREATE_GROUP_RESP).await.unwrap();
    let group_id = created.conversation_id;
    let _owner_conv_list: ConvListResponse = owner.recv(command::CONV_LIST_RESP).await.unwrap();
    let _b_system: MsgPush = member_b.recv(command::MSG_PUSH).await.unwrap();
    let _b_conv_list: ConvListResponse = member_b.recv(command::CONV_LIST_RESP).await.unwrap();
    let _c_system: MsgPush = member_c.recv(command::MSG_PUSH).await.unwrap();
    let _c_conv_list: ConvListResponse = member_c.recv(command::CONV_LIST_RESP).await.unwrap();

    member_b
        .send(command::LEAVE_CONV_REQ, &LeaveConvRequest { conversation_id: group_id })
        .await
        .unwrap();

    // B is removed from the membership cache before the post-leave
    // CONV_MEMBERS_RESP broadcast, so B's own socket never sees that
    // broadcast -- only the departure SYSTEM push and its own conv list.
    let b_leave_system: MsgPush = member_b.recv(command::MSG_PUSH).await.unwrap();
    assert_eq!(b_leave_system.msg_type, "SYSTEM");
    let _b_conv_list_final: ConvListResponse = member_b.recv(command::CONV_LIST_RESP).await.unwrap();
    let leave_resp: LeaveConvResponse = member_b.recv(command::LEAVE_CONV_RESP).await.unwrap();
    assert!(!leave_resp.dissolved);

    let _owner_leave_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let owner_members: ConvMembersResponse = owner.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    assert_eq!(owner_members.members.len(), 2);
    assert!(!owner_members.members.iter().any(|m| m.user_id == login_b.user_id));

    let _c_leave_system: MsgPush = member_c.recv(command::MSG_PUSH).await.unwrap();
    let _c_members: ConvMembersResponse = member_c.recv(command::CONV_MEMBERS_RESP).await.unwrap();
}
