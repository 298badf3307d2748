mod common;

use chat_protocol::*;
use common::{register_and_login, TestServer};

/// Spec scenario 4: accepting a friend request creates exactly one SINGLE
/// conversation between the two parties, and both sides see it.
#[tokio::test]
async fn friend_accept_creates_single_conversation() {
    let server = TestServer::start().await;
    let (mut alice, login_alice) = register_and_login(&server, "friend-a", "hunter2").await;
    let (mut bob, login_bob) = register_and_login(&server, "friend-b", "hunter2").await;

    alice
        .send(
            command::FRIEND_ADD_REQ,
            &FriendAddRequest {
                peer_user_id: login_bob.user_id,
                source: "search_account".to_owned(),
                hello_msg: "hi, let's be friends".to_owned(),
            },
        )
        .await
        .unwrap();
    let add_resp: FriendAddResponse = alice.recv(command::FRIEND_ADD_RESP).await.unwrap();
    assert!(add_resp.ok);

    let req_list: FriendReqListResponse = bob.recv(command::FRIEND_REQ_LIST_RESP).await.unwrap();
    assert_eq!(req_list.requests.len(), 1);
    let pending = &req_list.requests[0];
    assert_eq!(pending.from_user_id, login_alice.user_id);
    assert_eq!(pending.status, "PENDING");

    bob.send(command::FRIEND_ACCEPT_REQ, &FriendAcceptRequest { request_id: pending.request_id })
        .await
        .unwrap();

    let accept_resp: FriendAcceptResponse = bob.recv(command::FRIEND_ACCEPT_RESP).await.unwrap();
    assert!(accept_resp.ok);
    assert_eq!(accept_resp.conversation_type.as_deref(), Some("SINGLE"));
    assert_eq!(accept_resp.friend.user_id, login_alice.user_id);
    let conversation_id: i64 = accept_resp.conversation_id.parse().unwrap();

    // Alice's side: friend list, friend-req list, conv list all refresh.
    let alice_friends: FriendListResponse = alice.recv(command::FRIEND_LIST_RESP).await.unwrap();
    assert_eq!(alice_friends.friends.len(), 1);
    assert_eq!(alice_friends.friends[0].user_id, login_bob.user_id);
    let _alice_reqs: FriendReqListResponse = alice.recv(command::FRIEND_REQ_LIST_RESP).await.unwrap();
    let alice_convs: ConvListResponse = alice.recv(command::CONV_LIST_RESP).await.unwrap();
    assert!(alice_convs.conversations.iter().any(|c| c.conversation_id == conversation_id && c.conversation_type == "SINGLE"));

    // Bob's side, same three refreshes.
    let bob_friends: FriendListResponse = bob.recv(command::FRIEND_LIST_RESP).await.unwrap();
    assert_eq!(bob_friends.friends.len(), 1);
    assert_eq!(bob_friends.friends[0].user_id, login_alice.user_id);
    let bob_reqs: FriendReqListResponse = bob.recv(command::FRIEND_REQ_LIST_RESP).await.unwrap();
    assert!(bob_reqs.requests.is_empty() || bob_reqs.requests.iter().all(|r| r.status != "PENDING"));
    let bob_convs: ConvListResponse = bob.recv(command::CONV_LIST_RESP).await.unwrap();
    assert!(bob_convs.conversations.iter().any(|c| c.conversation_id == conversation_id && c.conversation_type == "SINGLE"));

    // Exactly one SINGLE conversation exists between them: verify via
    // membership, not a direct id comparison, since conv ids are opaque here.
    alice
        .send(
            command::CONV_MEMBERS_REQ,
            &ConvMembersRequest { conversation_id },
        )
        .await
        .unwrap();
    let members: ConvMembersResponse = alice.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    let mut member_ids: Vec<i64> = members.members.iter().map(|m| m.user_id).collect();
    member_ids.sort();
    let mut expected = vec![login_alice.user_id, login_bob.user_id];
    expected.sort();
    assert_eq!(member_ids, expected);
}

/// A group join request, once accepted by an admin, adds the requester and
/// refreshes everyone's membership/conversation views.
#[tokio::test]
async fn group_join_accept_adds_member() {
    let server = TestServer::start().await;
    let (mut owner, login_owner) = register_and_login(&server, "group-owner", "hunter2").await;
    let (_seed_a, login_seed_a) = register_and_login(&server, "group-seed-a", "hunter2").await;
    let (_seed_b, login_seed_b) = register_and_login(&server, "group-seed-b", "hunter2").await;
    let (mut joiner, login_joiner) = register_and_login(&server, "group-joiner", "hunter2").await;

    owner
        .send(
            command::CREATE_GROUP_REQ,
            &CreateGroupRequest {
                member_user_ids: vec![login_seed_a.user_id.to_string(), login_seed_b.user_id.to_string()],
                name: "open club".to_owned(),
            },
        )
        .await
        .unwrap();
    let _owner_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let created: CreateGroupResponse = owner.recv(command::CREATE_GROUP_RESP).await.unwrap();
    let group_id = created.conversation_id;
    let _owner_conv_list: ConvListResponse = owner.recv(command::CONV_LIST_RESP).await.unwrap();

    joiner
        .send(
            command::GROUP_SEARCH_REQ,
            &GroupSearchRequest { group_id },
        )
        .await
        .unwrap();
    let search: GroupSearchResponse = joiner.recv(command::GROUP_SEARCH_RESP).await.unwrap();
    assert!(!search.is_member);
    assert_eq!(search.name, "open club");

    joiner
        .send(
            command::GROUP_JOIN_REQ,
            &GroupJoinRequest {
                group_id,
                hello_msg: "let me in".to_owned(),
            },
        )
        .await
        .unwrap();
    let join_resp: GroupJoinResponse = joiner.recv(command::GROUP_JOIN_RESP).await.unwrap();
    assert!(join_resp.ok);

    let join_req_list: GroupJoinReqListResponse = owner.recv(command::GROUP_JOIN_REQ_LIST_RESP).await.unwrap();
    assert_eq!(join_req_list.requests.len(), 1);
    let pending = &join_req_list.requests[0];
    assert_eq!(pending.from_user_id, login_joiner.user_id);

    owner
        .send(
            command::GROUP_JOIN_ACCEPT_REQ,
            &GroupJoinAcceptRequest {
                request_id: pending.request_id,
                accept: true,
            },
        )
        .await
        .unwrap();

    let _join_system: MsgPush = owner.recv(command::MSG_PUSH).await.unwrap();
    let _owner_members: ConvMembersResponse = owner.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    let join_accept_resp: GroupJoinAcceptResponse = owner.recv(command::GROUP_JOIN_ACCEPT_RESP).await.unwrap();
    assert!(join_accept_resp.ok);
    let _owner_join_req_list_refresh: GroupJoinReqListResponse = owner.recv(command::GROUP_JOIN_REQ_LIST_RESP).await.unwrap();

    let _joiner_conv_list: ConvListResponse = joiner.recv(command::CONV_LIST_RESP).await.unwrap();

    owner
        .send(command::CONV_MEMBERS_REQ, &ConvMembersRequest { conversation_id: group_id })
        .await
        .unwrap();
    let members: ConvMembersResponse = owner.recv(command::CONV_MEMBERS_RESP).await.unwrap();
    assert!(members.members.iter().any(|m| m.user_id == login_joiner.user_id));
    assert_eq!(members.members.len(), 4);
    let _ = login_owner;
}
