use sqlx::PgPool;

pub struct FriendRow {
    pub user_id: i64,
    pub account: String,
    pub display_name: String,
}

pub struct FriendRequestRow {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub status: String,
    pub account: String,
    pub display_name: String,
    pub hello_msg: String,
}

pub async fn are_friends(pool: &PgPool, user_id: i64, other_id: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query!(
        r#"SELECT EXISTS(SELECT 1 FROM friends WHERE user_id = $1 AND friend_user_id = $2) AS "exists!""#,
        user_id,
        other_id
    )
    .fetch_one(pool)
    .await?;
    Ok(row.exists)
}

pub async fn list_friends(pool: &PgPool, user_id: i64) -> Result<Vec<FriendRow>, sqlx::Error> {
    sqlx::query_as!(
        FriendRow,
        r#"SELECT u.id AS user_id, u.account, u.display_name
           FROM friends f JOIN users u ON u.id = f.friend_user_id
           WHERE f.user_id = $1
           ORDER BY u.display_name"#,
        user_id
    )
    .fetch_all(pool)
    .await
}

/// Inserts both directions in one transaction, matching the source's
/// symmetric storage invariant.
pub async fn insert_symmetric(pool: &PgPool, user_a: i64, user_b: i64) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query!(
        r#"INSERT INTO friends (user_id, friend_user_id) VALUES ($1, $2)
           ON CONFLICT DO NOTHING"#,
        user_a,
        user_b
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!(
        r#"INSERT INTO friends (user_id, friend_user_id) VALUES ($1, $2)
           ON CONFLICT DO NOTHING"#,
        user_b,
        user_a
    )
    .execute(&mut *tx)
    .await?;
    tx.commit().await
}

/// Deletes both directions in one transaction.
pub async fn delete_symmetric(pool: &PgPool, user_a: i64, user_b: i64) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query!(
        "DELETE FROM friends WHERE user_id = $1 AND friend_user_id = $2",
        user_a,
        user_b
    )
    .execute(&mut *tx)
    .await?;
    sqlx::query!(
        "DELETE FROM friends WHERE user_id = $1 AND friend_user_id = $2",
        user_b,
        user_a
    )
    .execute(&mut *tx)
    .await?;
    tx.commit().await
}

pub async fn find_pending_between(
    pool: &PgPool,
    user_a: i64,
    user_b: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query!(
        r#"SELECT id FROM friend_requests
           WHERE status = 'PENDING'
             AND ((from_user_id = $1 AND to_user_id = $2) OR (from_user_id = $2 AND to_user_id = $1))"#,
        user_a,
        user_b
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.id))
}

pub async fn create_request(
    pool: &PgPool,
    from_user_id: i64,
    to_user_id: i64,
    source: &str,
    hello_msg: &str,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query!(
        r#"INSERT INTO friend_requests (from_user_id, to_user_id, status, source, hello_msg)
           VALUES ($1, $2, 'PENDING', $3, $4)
           RETURNING id"#,
        from_user_id,
        to_user_id,
        source,
        hello_msg
    )
    .fetch_one(pool)
    .await?;
    Ok(row.id)
}

pub struct PendingRequest {
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub status: String,
}

pub async fn find_request(pool: &PgPool, request_id: i64) -> Result<Option<PendingRequest>, sqlx::Error> {
    sqlx::query_as!(
        PendingRequest,
        "SELECT from_user_id, to_user_id, status FROM friend_requests WHERE id = $1",
        request_id
    )
    .fetch_optional(pool)
    .await
}

pub async fn mark_accepted(pool: &PgPool, request_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE friend_requests SET status = 'ACCEPTED', handled_at = now() WHERE id = $1",
        request_id
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_rejected(pool: &PgPool, request_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE friend_requests SET status = 'REJECTED', handled_at = now() WHERE id = $1",
        request_id
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Incoming requests addressed to `user_id`. Matches the source's filter:
/// `PENDING` and `ACCEPTED` rows are shown, `REJECTED` ones drop off the list.
pub async fn incoming_requests(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<FriendRequestRow>, sqlx::Error> {
    sqlx::query_as!(
        FriendRequestRow,
        r#"SELECT fr.id, fr.from_user_id, fr.to_user_id, fr.status,
                  u.account, u.display_name, fr.hello_msg
           FROM friend_requests fr JOIN users u ON u.id = fr.from_user_id
           WHERE fr.to_user_id = $1 AND fr.status IN ('PENDING', 'ACCEPTED')
           ORDER BY fr.created_at DESC"#,
        user_id
    )
    .fetch_all(pool)
    .await
}
