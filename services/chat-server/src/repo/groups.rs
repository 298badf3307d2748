use sqlx::PgPool;

pub struct GroupSearchRow {
    pub group_id: i64,
    pub name: String,
    pub member_count: Option<i64>,
}

pub async fn find_group(pool: &PgPool, group_id: i64) -> Result<Option<GroupSearchRow>, sqlx::Error> {
    sqlx::query_as!(
        GroupSearchRow,
        r#"SELECT c.id AS group_id, c.name,
                  (SELECT COUNT(*) FROM conversation_members m WHERE m.conversation_id = c.id) AS member_count
           FROM conversations c WHERE c.id = $1 AND c.conv_type = 'GROUP'"#,
        group_id
    )
    .fetch_optional(pool)
    .await
}

pub async fn find_pending_join(
    pool: &PgPool,
    from_user_id: i64,
    group_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query!(
        r#"SELECT id FROM group_join_requests
           WHERE from_user_id = $1 AND group_id = $2 AND status = 'PENDING'"#,
        from_user_id,
        group_id
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.id))
}

pub async fn create_join_request(
    pool: &PgPool,
    from_user_id: i64,
    group_id: i64,
    hello_msg: &str,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query!(
        r#"INSERT INTO group_join_requests (from_user_id, group_id, status, hello_msg)
           VALUES ($1, $2, 'PENDING', $3)
           RETURNING id"#,
        from_user_id,
        group_id,
        hello_msg
    )
    .fetch_one(pool)
    .await?;
    Ok(row.id)
}

pub struct JoinRequestRow {
    pub id: i64,
    pub from_user_id: i64,
    pub account: String,
    pub display_name: String,
    pub group_id: i64,
    pub group_name: String,
    pub status: String,
    pub hello_msg: String,
}

pub struct PendingJoinRequest {
    pub from_user_id: i64,
    pub group_id: i64,
    pub status: String,
}

pub async fn find_join_request(
    pool: &PgPool,
    request_id: i64,
) -> Result<Option<PendingJoinRequest>, sqlx::Error> {
    sqlx::query_as!(
        PendingJoinRequest,
        "SELECT from_user_id, group_id, status FROM group_join_requests WHERE id = $1",
        request_id
    )
    .fetch_optional(pool)
    .await
}

pub async fn mark_handled(
    pool: &PgPool,
    request_id: i64,
    handler_user_id: i64,
    status: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"UPDATE group_join_requests
           SET status = $1, handler_user_id = $2, handled_at = now()
           WHERE id = $3"#,
        status,
        handler_user_id,
        request_id
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Join requests for groups `user_id` administers (OWNER or ADMIN). All
/// three terminal states remain visible, matching the source's unfiltered
/// `status IN ('PENDING','ACCEPTED','REJECTED')` query (Open Question iii).
pub async fn requests_for_admin(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<JoinRequestRow>, sqlx::Error> {
    sqlx::query_as!(
        JoinRequestRow,
        r#"SELECT gjr.id, gjr.from_user_id, u.account, u.display_name,
                  gjr.group_id, c.name AS group_name, gjr.status, gjr.hello_msg
           FROM group_join_requests gjr
           JOIN users u ON u.id = gjr.from_user_id
           JOIN conversations c ON c.id = gjr.group_id
           JOIN conversation_members m ON m.conversation_id = gjr.group_id AND m.user_id = $1
           WHERE m.role IN ('OWNER', 'ADMIN')
             AND gjr.status IN ('PENDING', 'ACCEPTED', 'REJECTED')
           ORDER BY gjr.created_at DESC"#,
        user_id
    )
    .fetch_all(pool)
    .await
}
